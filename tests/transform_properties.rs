use console_remover::{transform, transform_source, Dialect, TransformError};

const SAMPLES: &[(&str, Dialect)] = &[
    ("console.log(\"hi\");\nfoo();\n", Dialect::Script),
    ("let x = console.log(\"hi\");\n", Dialect::Script),
    ("(console.log(\"a\"), doSomething());\n", Dialect::Script),
    (
        "export function f(a) {\n  if (a) console.warn(a);\n  else console.error('none');\n  return (console.info(a), a ?? console.debug());\n}\n",
        Dialect::Script,
    ),
    (
        "import { h } from './h';\n@decorate\nclass A {\n  static count = 0;\n  @watch method(v: number): void {\n    console.log(v, A.count);\n    h?.(console.trace());\n  }\n}\n",
        Dialect::TypedSuperset,
    ),
    (
        "const View = ({ items }: Props) => (\n  <ul>\n    {items.map((i) => (console.log(i), <li key={i}>{i}</li>))}\n  </ul>\n);\n",
        Dialect::TypedSuperset,
    ),
];

#[test]
fn transform_is_idempotent() {
    for (src, dialect) in SAMPLES {
        let once = transform(src, *dialect).unwrap();
        let twice = transform(&once, *dialect).unwrap();
        assert_eq!(once, twice, "not idempotent for:\n{src}");
        assert!(!once.contains("console."), "console call left in:\n{once}");
    }
}

#[test]
fn sources_without_console_calls_are_untouched() {
    let srcs = [
        "// a file with no diagnostics\nconst   spaced = { a : 1 };\n\n\nexport default spaced\n",
        "logger.log('x');\nconsoleLike.log(1);\nconst c = console;\nconsole?.log('optional');\n",
        "/* console.log('in a comment') */\nconst s = \"console.log('in a string')\";\n",
    ];
    for src in srcs {
        assert_eq!(transform(src, Dialect::Script).unwrap(), src);
    }
}

#[test]
fn statement_erasure_keeps_order() {
    let out = transform("console.log(\"hi\");\nfoo();\nbar();\n", Dialect::Script).unwrap();
    assert_eq!(out, "foo();\nbar();\n");
}

#[test]
fn sub_expression_neutralization() {
    assert_eq!(
        transform("let x = console.log(\"hi\");\n", Dialect::Script).unwrap(),
        "let x = undefined;\n"
    );
}

#[test]
fn sequence_filtering() {
    assert_eq!(
        transform("(console.log(\"a\"), doSomething());\n", Dialect::Script).unwrap(),
        "(doSomething());\n"
    );
}

#[test]
fn method_names_are_not_discriminated() {
    for method in ["log", "warn", "error", "debug", "info", "table"] {
        let src = format!("console.{method}(\"x\");\nkeep();\n");
        assert_eq!(transform(&src, Dialect::Script).unwrap(), "keep();\n", "console.{method}");
    }
}

#[test]
fn shadowed_console_binding_is_still_removed() {
    // The identifier is matched by name only; a local `console` is treated like the global.
    let src = "const console = { log() {} };\nconsole.log(\"x\");\n";
    assert_eq!(
        transform(src, Dialect::Script).unwrap(),
        "const console = { log() {} };\n"
    );
}

#[test]
fn unrelated_comments_survive_verbatim() {
    let src = "/**\n * Module docs.\n */\nimport a from 'a'; // trailing\n\nconsole.log(a);\n\n// closing remark\nexport { a };\n";
    let out = transform(src, Dialect::Script).unwrap();
    assert_eq!(
        out,
        "/**\n * Module docs.\n */\nimport a from 'a'; // trailing\n\n\n// closing remark\nexport { a };\n"
    );
}

#[test]
fn malformed_input_fails_without_text() {
    let result = transform("function f() {\n  console.log(1);\n", Dialect::Script);
    match result {
        Err(TransformError::Parse { dialect, .. }) => assert_eq!(dialect, Dialect::Script),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn type_syntax_needs_the_typed_dialect() {
    let src = "const n: number = 1;\nconsole.log(n);\n";
    assert!(transform(src, Dialect::Script).unwrap_err().is_parse());
    assert_eq!(transform(src, Dialect::TypedSuperset).unwrap(), "const n: number = 1;\n");
}

#[test]
fn removed_count_is_reported() {
    let out = transform_source(SAMPLES[3].0, Dialect::Script).unwrap();
    assert_eq!(out.removed, 4);
    assert_eq!(
        out.text,
        "export function f(a) {\n  if (a) {}\n  return (a ?? undefined);\n}\n"
    );
}
