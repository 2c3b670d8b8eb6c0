//! File-level adapters around [`transform_source`]: read, rewrite, write back when the
//! text changed. Batch runs contain failures per file and never abort.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::dialect::Dialect;
use crate::scanner::SourceFile;
use crate::transform::transform_source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Binary,
    Minified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Console calls were erased and the file was written.
    Rewritten { removed: usize },
    /// Console calls were found; nothing was written (check mode).
    WouldRewrite { removed: usize },
    Unchanged,
    Skipped { reason: SkipReason },
}

impl Outcome {
    pub fn is_change(&self) -> bool {
        matches!(self, Outcome::Rewritten { .. } | Outcome::WouldRewrite { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Write changed files back to disk.
    pub write: bool,
    pub skip_minified: bool,
    /// Force a dialect instead of inferring it from the extension.
    pub dialect: Option<Dialect>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            write: true,
            skip_minified: true,
            dialect: None,
        }
    }
}

/// Return true when a source text looks minified or machine-generated.
///
/// Heuristic: inspect the first 5 non-empty lines. If *any* single line exceeds 2 000 chars
/// the file is almost certainly a bundle.
pub fn is_minified_or_generated(source_text: &str) -> bool {
    const MAX_SAFE_LINE_CHARS: usize = 2_000;
    source_text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(5)
        .any(|l| l.len() > MAX_SAFE_LINE_CHARS)
}

/// Rewrite a single file in place. The file is only written when the output differs.
pub fn process_file(path: &Path, opts: &ProcessOptions) -> Result<Outcome> {
    // Binary-safe read: detect null bytes before attempting UTF-8 decode.
    let raw = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.contains(&0u8) {
        return Ok(Outcome::Skipped {
            reason: SkipReason::Binary,
        });
    }
    let text = String::from_utf8(raw).with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    if opts.skip_minified && is_minified_or_generated(&text) {
        return Ok(Outcome::Skipped {
            reason: SkipReason::Minified,
        });
    }

    let dialect = opts.dialect.unwrap_or_else(|| Dialect::from_path(path));
    let out = transform_source(&text, dialect).with_context(|| format!("Failed to transform {}", path.display()))?;

    if out.text == text {
        return Ok(Outcome::Unchanged);
    }
    if !opts.write {
        return Ok(Outcome::WouldRewrite { removed: out.removed });
    }

    std::fs::write(path, &out.text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Outcome::Rewritten { removed: out.removed })
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn changed(&self) -> usize {
        self.count(|o| o.is_change())
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Unchanged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }

    pub fn removed(&self) -> usize {
        self.files
            .iter()
            .filter_map(|f| match f.outcome {
                Some(Outcome::Rewritten { removed }) | Some(Outcome::WouldRewrite { removed }) => Some(removed),
                _ => None,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome.as_ref().is_some_and(&pred))
            .count()
    }
}

/// Process many files in parallel. `on_done` is called once per file as it finishes
/// (from worker threads); the report keeps the input order.
pub fn process_batch<F>(files: &[SourceFile], opts: &ProcessOptions, on_done: F) -> BatchReport
where
    F: Fn(&SourceFile) + Sync,
{
    let files = files
        .par_iter()
        .map(|file| {
            let report = match process_file(&file.abs_path, opts) {
                Ok(outcome) => {
                    match outcome {
                        Outcome::Skipped { reason } => info!("skipped {} ({reason:?})", file.rel_path.display()),
                        other => debug!("{}: {other:?}", file.rel_path.display()),
                    }
                    FileReport {
                        path: file.rel_path.clone(),
                        outcome: Some(outcome),
                        error: None,
                    }
                }
                Err(err) => {
                    warn!("error processing {}: {err:#}", file.rel_path.display());
                    FileReport {
                        path: file.rel_path.clone(),
                        outcome: None,
                        error: Some(format!("{err:#}")),
                    }
                }
            };
            on_done(file);
            report
        })
        .collect();

    BatchReport { files }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn entry(root: &Path, rel: &str, body: &str) -> SourceFile {
        let abs = root.join(rel);
        std::fs::write(&abs, body).unwrap();
        SourceFile {
            abs_path: abs,
            rel_path: PathBuf::from(rel),
            bytes: body.len() as u64,
        }
    }

    #[test]
    fn rewrites_only_when_changed() {
        let tmp = TempDir::new().unwrap();
        let dirty = entry(tmp.path(), "dirty.js", "console.log(1);\nrun();\n");
        let clean = entry(tmp.path(), "clean.js", "run( );\n");

        let before = std::fs::metadata(&clean.abs_path).unwrap().modified().unwrap();
        let o1 = process_file(&dirty.abs_path, &ProcessOptions::default()).unwrap();
        let o2 = process_file(&clean.abs_path, &ProcessOptions::default()).unwrap();

        assert_eq!(o1, Outcome::Rewritten { removed: 1 });
        assert_eq!(o2, Outcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&dirty.abs_path).unwrap(), "run();\n");
        assert_eq!(std::fs::metadata(&clean.abs_path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn check_mode_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let f = entry(tmp.path(), "a.ts", "const n: number = console.log(1) ?? 0;\n");
        let opts = ProcessOptions {
            write: false,
            ..ProcessOptions::default()
        };
        assert_eq!(process_file(&f.abs_path, &opts).unwrap(), Outcome::WouldRewrite { removed: 1 });
        assert_eq!(
            std::fs::read_to_string(&f.abs_path).unwrap(),
            "const n: number = console.log(1) ?? 0;\n"
        );
    }

    #[test]
    fn binary_and_minified_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let bin = entry(tmp.path(), "blob.js", "console.log(1);\0\0");
        let min = entry(tmp.path(), "bundle.js", &format!("console.log(1);{}\n", "a();".repeat(600)));

        let opts = ProcessOptions::default();
        assert_eq!(
            process_file(&bin.abs_path, &opts).unwrap(),
            Outcome::Skipped { reason: SkipReason::Binary }
        );
        assert_eq!(
            process_file(&min.abs_path, &opts).unwrap(),
            Outcome::Skipped { reason: SkipReason::Minified }
        );
    }

    #[test]
    fn parse_failure_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let body = "console.log(1);\nfunction f( {\n";
        let f = entry(tmp.path(), "broken.js", body);
        assert!(process_file(&f.abs_path, &ProcessOptions::default()).is_err());
        assert_eq!(std::fs::read_to_string(&f.abs_path).unwrap(), body);
    }

    #[test]
    fn batch_continues_past_failures() {
        let tmp = TempDir::new().unwrap();
        let files = vec![
            entry(tmp.path(), "a.js", "console.log('a');\na();\n"),
            entry(tmp.path(), "b.js", "let = ;\n"),
            entry(tmp.path(), "c.ts", "let c: string = 'c';\n"),
            entry(tmp.path(), "d.tsx", "export const D = () => <p>{console.warn('d')}</p>;\n"),
        ];

        let done = AtomicUsize::new(0);
        let report = process_batch(&files, &ProcessOptions::default(), |_| {
            done.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(done.load(Ordering::SeqCst), 4);
        assert_eq!(report.files.len(), 4);
        assert_eq!(report.files[1].path, PathBuf::from("b.js"));
        assert_eq!(report.changed(), 2);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.removed(), 2);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("d.tsx")).unwrap(),
            "export const D = () => <p>{undefined}</p>;\n"
        );
    }

    #[test]
    fn report_serializes_flat() {
        let report = BatchReport {
            files: vec![FileReport {
                path: PathBuf::from("x.js"),
                outcome: Some(Outcome::Rewritten { removed: 3 }),
                error: None,
            }],
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["files"][0]["status"], "rewritten");
        assert_eq!(v["files"][0]["removed"], 3);
    }
}
