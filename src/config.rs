use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional per-project config file, looked up at the scan root.
pub const CONFIG_FILE_NAME: &str = ".console-remover.json";

/// Hard safety ceiling: files larger than this are **always** skipped, regardless of config.
/// Multi-megabyte sources are almost always bundles, not code anyone wants rewritten.
pub const ABSOLUTE_MAX_FILE_BYTES: u64 = 1_000_000; // 1 MB

/// Controls workspace scanning behavior (what to visit, what to skip).
///
/// Note: `.gitignore` is always respected by the scanner; these are additional
/// hard skips for noisy monorepo directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions (lowercase, without dot) that are rewritten.
    pub extensions: Vec<String>,

    /// Directory *names* to skip anywhere in the tree (e.g. "generated", "vendor").
    ///
    /// These are compared against path components, not full paths.
    pub exclude_dir_names: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "jsx", "ts", "tsx"].iter().map(|s| s.to_string()).collect(),
            exclude_dir_names: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings that govern file discovery and exclusion.
    pub scan: ScanConfig,
    /// Files above this size are left alone (clamped to [`ABSOLUTE_MAX_FILE_BYTES`]).
    pub max_file_bytes: u64,
    /// Skip files that look minified (very long leading lines).
    pub skip_minified: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            // 512 KB default: enough for any hand-written source file.
            max_file_bytes: 512 * 1024,
            skip_minified: true,
        }
    }
}

impl Config {
    pub fn effective_max_file_bytes(&self) -> u64 {
        self.max_file_bytes.min(ABSOLUTE_MAX_FILE_BYTES)
    }
}

/// Load `<root>/.console-remover.json`; a missing or malformed file yields defaults.
pub fn load_config(root: &Path) -> Config {
    let primary = root.join(CONFIG_FILE_NAME);

    let text = std::fs::read_to_string(&primary);
    let Ok(text) = text else { return Config::default() };

    match serde_json::from_str::<Config>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("ignoring {}: {e}", primary.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.scan.extensions, vec!["js", "jsx", "ts", "tsx"]);
        assert!(cfg.skip_minified);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"{"scan": {"exclude_dir_names": ["generated"]}, "max_file_bytes": 99999999}"#,
        )
        .unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.scan.exclude_dir_names, vec!["generated"]);
        assert_eq!(cfg.scan.extensions.len(), 4);
        assert_eq!(cfg.effective_max_file_bytes(), ABSOLUTE_MAX_FILE_BYTES);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.max_file_bytes, 512 * 1024);
    }
}
