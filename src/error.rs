use thiserror::Error;

use crate::dialect::Dialect;

/// Failures of a single transformation call. The caller's source is never touched.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{dialect} parse error at {line}:{column}: unexpected {found}")]
    Parse {
        dialect: Dialect,
        /// 1-based
        line: usize,
        /// 1-based, in bytes
        column: usize,
        found: String,
    },

    /// A rewrite left the source in a state that no longer parses, or produced
    /// conflicting edits. Never expected; output is discarded.
    #[error("rewrite produced invalid {dialect} output: {reason}")]
    Serialization { dialect: Dialect, reason: String },

    #[error("failed to load the {dialect} grammar")]
    Grammar {
        dialect: Dialect,
        #[source]
        source: tree_sitter::LanguageError,
    },
}

impl TransformError {
    pub fn is_parse(&self) -> bool {
        matches!(self, TransformError::Parse { .. })
    }
}
