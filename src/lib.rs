//! Remove `console.*` diagnostic calls from JavaScript / TypeScript sources.
//!
//! The core is [`transform`]: a pure function of (text, dialect) that parses with
//! tree-sitter, erases console calls according to their syntactic context and splices the
//! result back into the original text. Everything else in this crate (config, discovery,
//! batch processing) is host plumbing around it.

pub mod classifier;
pub mod config;
pub mod dialect;
pub mod error;
pub mod parser;
pub mod processor;
pub mod rewriter;
pub mod scanner;
pub mod transform;

pub use dialect::Dialect;
pub use error::TransformError;
pub use transform::{transform, transform_source, Transformed};

/// Install the stderr log subscriber. `verbosity` 0 = warn, 1 = info, 2+ = debug;
/// `RUST_LOG` wins when set.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("console_remover={default_level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
