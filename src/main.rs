use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console_remover::config::load_config;
use console_remover::processor::{process_batch, process_file, Outcome, ProcessOptions};
use console_remover::scanner::{scan_sources, ScanOptions};
use console_remover::{init_tracing, transform_source, Dialect};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "console-remover")]
#[command(version)]
#[command(about = "Remove console.* calls from JavaScript / TypeScript sources")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Remove console statements from a single file
    File {
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        /// Parse as this dialect instead of inferring it from the extension
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Do not write; exit with status 1 if the file would change
        #[arg(long)]
        check: bool,
    },

    /// Read source from stdin and write the cleaned source to stdout
    Stdin {
        #[arg(long, value_enum, conflicts_with = "language_id")]
        dialect: Option<Dialect>,

        /// Editor language id (e.g. typescriptreact) used to pick the dialect
        #[arg(long)]
        language_id: Option<String>,
    },

    /// Remove console statements from every JS/TS file under ROOT
    Workspace {
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Do not write; list files that would change and exit 1 if any would
        #[arg(long)]
        check: bool,

        /// Extra directory name to skip (repeatable)
        #[arg(long = "exclude-dir", value_name = "NAME")]
        exclude_dirs: Vec<String>,

        /// Override the max file size (bytes)
        #[arg(long)]
        max_file_bytes: Option<u64>,

        /// Print the per-file report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::File { path, dialect, check } => run_file(&path, dialect, check),
        Command::Stdin { dialect, language_id } => {
            let dialect = match (dialect, language_id) {
                (Some(d), _) => d,
                (None, Some(id)) => Dialect::from_language_id(&id),
                (None, None) => Dialect::Script,
            };
            run_stdin(dialect)
        }
        Command::Workspace {
            root,
            yes,
            check,
            exclude_dirs,
            max_file_bytes,
            json,
        } => run_workspace(&root, yes, check, exclude_dirs, max_file_bytes, json),
    }
}

fn run_file(path: &Path, dialect: Option<Dialect>, check: bool) -> Result<ExitCode> {
    let cfg = load_config(&std::env::current_dir().context("Failed to get current dir")?);
    let opts = ProcessOptions {
        write: !check,
        skip_minified: cfg.skip_minified,
        dialect,
    };

    let outcome = process_file(path, &opts)?;
    match outcome {
        Outcome::Unchanged => println!("No console statements found in {}.", path.display()),
        Outcome::Rewritten { removed } => {
            println!("Console statements removed from {} ({removed}).", path.display())
        }
        Outcome::WouldRewrite { removed } => {
            println!("{}: {removed} console statement(s) would be removed.", path.display());
            return Ok(ExitCode::from(1));
        }
        Outcome::Skipped { reason } => println!("Skipped {} ({reason:?}).", path.display()),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_stdin(dialect: Dialect) -> Result<ExitCode> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;

    // On failure nothing is written to stdout, so a caller piping back into the buffer
    // keeps its original text.
    let out = transform_source(&text, dialect)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.text.as_bytes())?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn run_workspace(
    root: &Path,
    yes: bool,
    check: bool,
    exclude_dirs: Vec<String>,
    max_file_bytes: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir().context("Failed to get current dir")?.join(root)
    };

    let mut cfg = load_config(&root);
    if let Some(max) = max_file_bytes {
        cfg.max_file_bytes = max;
    }
    let mut exclude_dir_names = cfg.scan.exclude_dir_names.clone();
    exclude_dir_names.extend(exclude_dirs);

    let opts = ScanOptions {
        root: root.clone(),
        target: PathBuf::from("."),
        extensions: cfg.scan.extensions.clone(),
        max_file_bytes: cfg.effective_max_file_bytes(),
        exclude_dir_names,
    };

    let scan_spinner = ProgressBar::new_spinner();
    scan_spinner.set_style(
        ProgressStyle::with_template("{spinner} scanning files...")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    scan_spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    let files = scan_sources(&opts)?;
    scan_spinner.finish_and_clear();

    if files.is_empty() {
        eprintln!("No JS/TS files found in {}.", root.display());
        return Ok(ExitCode::SUCCESS);
    }

    if !check && !yes && !confirm(files.len())? {
        eprintln!("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} [{bar:30}] {pos}/{len} files processed",
    )?);
    let process_opts = ProcessOptions {
        write: !check,
        skip_minified: cfg.skip_minified,
        dialect: None,
    };
    let report = process_batch(&files, &process_opts, |_| bar.inc(1));
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for f in &report.files {
            if let Some(err) = &f.error {
                eprintln!("error: {err}");
            } else if check && f.outcome.is_some_and(|o| o.is_change()) {
                println!("{}", f.path.display());
            }
        }
    }

    let verb = if check { "would change" } else { "changed" };
    eprintln!(
        "{} files {verb} ({} console calls), {} unchanged, {} skipped, {} failed",
        report.changed(),
        report.removed(),
        report.unchanged(),
        report.skipped(),
        report.failed(),
    );

    if report.failed() > 0 || (check && report.changed() > 0) {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn confirm(count: usize) -> Result<bool> {
    eprint!("This will modify {count} files and remove all console statements. Continue? [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
