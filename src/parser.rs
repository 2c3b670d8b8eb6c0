use tree_sitter::{Node, Parser, Tree};

use crate::dialect::Dialect;
use crate::error::TransformError;

/// Parse `source` as a module under `dialect`.
///
/// Tree-sitter recovers from syntax errors by inserting ERROR / MISSING nodes; any such
/// node makes the whole parse fail so that no best-effort tree reaches the rewriter.
pub fn parse(source: &str, dialect: Dialect) -> Result<Tree, TransformError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|source| TransformError::Grammar { dialect, source })?;

    let tree = parser.parse(source, None).ok_or_else(|| TransformError::Parse {
        dialect,
        line: 1,
        column: 1,
        found: "end of input (parser gave up)".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error_node(root).unwrap_or(root);
        return Err(parse_error_at(bad, source, dialect));
    }

    Ok(tree)
}

/// Depth-first, document-order search for the first ERROR or MISSING node.
fn first_error_node(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn parse_error_at(node: Node<'_>, source: &str, dialect: Dialect) -> TransformError {
    let pos = node.start_position();
    let found = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        let text = source.get(node.start_byte()..node.end_byte()).unwrap_or("");
        let snippet: String = text.chars().take(40).collect();
        if snippet.trim().is_empty() {
            "end of input".to_string()
        } else {
            format!("'{}'", snippet.trim())
        }
    };

    TransformError::Parse {
        dialect,
        line: pos.row + 1,
        column: pos.column + 1,
        found,
    }
}
