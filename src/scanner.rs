use anyhow::{Context, Result};
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Directories that never hold code worth rewriting.
const ALWAYS_SKIPPED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "bower_components",
    "dist",
    "build",
    "coverage",
    ".next",
    ".nuxt",
    ".vscode-test",
    "out",
    "target",
];

fn default_overrides(root: &Path, exclude_dir_names: &[String]) -> Result<Override> {
    let mut ob = OverrideBuilder::new(root);

    // Overrides use gitignore syntax; a leading '!' turns a pattern into an ignore rule.
    // Directories need both the entry and its descendants, otherwise the walker still
    // descends into them.
    for d in ALWAYS_SKIPPED_DIRS {
        ob.add(&format!("!**/{d}"))?;
        ob.add(&format!("!**/{d}/**"))?;
    }

    // Minified bundles
    ob.add("!**/*.min.js")?;
    ob.add("!**/*.min.mjs")?;
    ob.add("!**/*.bundle.js")?;

    // Project-specific excluded dirs
    for d in exclude_dir_names {
        let d = d.trim().trim_matches('/');
        if d.is_empty() {
            continue;
        }
        ob.add(&format!("!**/{d}"))?;
        ob.add(&format!("!**/{d}/**"))?;
    }

    Ok(ob.build()?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub abs_path: PathBuf,
    pub rel_path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub target: PathBuf,
    pub extensions: Vec<String>,
    pub max_file_bytes: u64,
    pub exclude_dir_names: Vec<String>,
}

impl ScanOptions {
    pub fn target_root(&self) -> PathBuf {
        if self.target.is_absolute() {
            self.target.clone()
        } else {
            self.root.join(&self.target)
        }
    }

    fn wants_extension(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        !ext.is_empty() && self.extensions.iter().any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

/// Find every rewritable source file under the target, sorted by relative path.
pub fn scan_sources(opts: &ScanOptions) -> Result<Vec<SourceFile>> {
    let target_root = opts.target_root();

    let meta = std::fs::metadata(&target_root)
        .with_context(|| format!("Target does not exist: {}", target_root.display()))?;

    let overrides = default_overrides(&opts.root, &opts.exclude_dir_names)?;

    if meta.is_file() {
        if overrides.matched(&target_root, false).is_ignore() {
            return Ok(vec![]);
        }
        return Ok(source_file(opts, target_root, meta.len())?.into_iter().collect());
    }

    let walker = WalkBuilder::new(&target_root)
        .standard_filters(true) // .gitignore, .ignore, hidden, etc.
        .require_git(false)
        .overrides(overrides)
        .build();

    let mut entries = Vec::new();
    for item in walker {
        let dent = match item {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!("walk error: {e}");
                continue;
            }
        };

        if !dent.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let abs_path = dent.into_path();
        let bytes = match std::fs::metadata(&abs_path).map(|m| m.len()) {
            Ok(b) => b,
            Err(_) => continue,
        };

        if let Some(entry) = source_file(opts, abs_path, bytes)? {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(entries)
}

fn source_file(opts: &ScanOptions, abs_path: PathBuf, bytes: u64) -> Result<Option<SourceFile>> {
    if !opts.wants_extension(&abs_path) {
        return Ok(None);
    }
    if bytes == 0 || bytes > opts.max_file_bytes {
        tracing::info!("skipping {} ({bytes} bytes)", abs_path.display());
        return Ok(None);
    }

    let rel_path = path_relative_to(&abs_path, &opts.root)
        .with_context(|| format!("Failed to relativize path: {}", abs_path.display()))?;

    Ok(Some(SourceFile {
        abs_path,
        rel_path,
        bytes,
    }))
}

fn path_relative_to(path: &Path, base: &Path) -> Result<PathBuf> {
    // Targets outside the root keep their own path.
    match path.strip_prefix(base) {
        Ok(rel) => Ok(rel.to_path_buf()),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => anyhow::bail!("{} is not under {}", path.display(), base.display()),
    }
}
