use tree_sitter::Node;

/// Identifier whose member calls are treated as diagnostic logging.
pub const CONSOLE_IDENT: &str = "console";

/// True when `node` is a call like `console.log(...)` or `console["warn"](...)`.
///
/// Any method name matches. The identifier is matched by text only: a local binding
/// named `console` is treated exactly like the global. Optional calls
/// (`console?.log()`, `console.log?.()`) and tagged templates are not plain calls and
/// never match.
pub fn is_console_call(node: Node<'_>, source: &[u8]) -> bool {
    if node.kind() != "call_expression" {
        return false;
    }
    if node.child_by_field_name("optional_chain").is_some() {
        return false;
    }
    match node.child_by_field_name("arguments") {
        Some(args) if args.kind() == "arguments" => {}
        _ => return false,
    }
    let Some(callee) = node.child_by_field_name("function") else {
        return false;
    };

    let callee = strip_parens(callee);
    if !matches!(callee.kind(), "member_expression" | "subscript_expression") {
        return false;
    }
    if callee.child_by_field_name("optional_chain").is_some() {
        return false;
    }

    let Some(object) = callee.child_by_field_name("object") else {
        return false;
    };
    let object = strip_parens(object);
    object.kind() == "identifier" && node_text(source, object) == CONSOLE_IDENT
}

/// Look through any number of wrapping parentheses: `((x))` -> `x`.
///
/// Parentheses carrying a type annotation (`(x: T)`) are left alone.
pub fn strip_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        let mut cursor = node.walk();
        let inner: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment")
            .collect();
        match inner.as_slice() {
            [only] => node = *only,
            _ => break,
        }
    }
    node
}

pub fn node_text<'a>(source: &'a [u8], node: Node<'_>) -> &'a str {
    std::str::from_utf8(&source[node.start_byte()..node.end_byte()]).unwrap_or("")
}
