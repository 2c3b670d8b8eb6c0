use tracing::debug;

use crate::dialect::Dialect;
use crate::error::TransformError;
use crate::parser::parse;
use crate::rewriter::{collect_edits, splice};

/// Output of one transformation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// Console calls erased (nested calls inside an erased call are not counted).
    pub removed: usize,
}

impl Transformed {
    pub fn changed(&self) -> bool {
        self.removed > 0
    }
}

/// Strip every `console.*(...)` call from `source`.
///
/// Returns `source` unchanged (byte-for-byte) when it contains no console call.
/// Fails with [`TransformError::Parse`] when `source` is not valid for `dialect`.
pub fn transform(source: &str, dialect: Dialect) -> Result<String, TransformError> {
    transform_source(source, dialect).map(|t| t.text)
}

/// Like [`transform`], but also reports how many calls were erased.
pub fn transform_source(source: &str, dialect: Dialect) -> Result<Transformed, TransformError> {
    let tree = parse(source, dialect)?;
    let rewrite = collect_edits(&tree, source);

    if rewrite.edits.is_empty() {
        return Ok(Transformed {
            text: source.to_string(),
            removed: 0,
        });
    }

    let text = splice(source, dialect, rewrite.edits)?;

    // The rewritten text must still be a valid program of the same dialect.
    if let Err(err) = parse(&text, dialect) {
        return Err(TransformError::Serialization {
            dialect,
            reason: err.to_string(),
        });
    }

    debug!(dialect = %dialect, removed = rewrite.removed, "erased console calls");
    Ok(Transformed {
        text,
        removed: rewrite.removed,
    })
}
