//! DirSleuth: quick directory statistics.
//!
//! Thin binary entry point. All logic lives in the `dirsleuth-core` crate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dirsleuth_core::report::{self, TextStyle};
use dirsleuth_core::{BaseDir, ScanOptions, SortBy};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Single-pass directory statistics
#[derive(Parser)]
#[command(name = "dirsleuth", version)]
#[command(about = "Summarise a directory tree in one pass", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory tree and print its statistics
    Stats {
        /// Directory to scan (defaults to the current directory)
        path: Option<PathBuf>,
        /// Follow symbolic links into their targets
        #[arg(long)]
        follow_symlinks: bool,
        /// Extensions kept in each top-N ranking
        #[arg(long, value_name = "N", default_value_t = dirsleuth_core::scanner::DEFAULT_TOP_N)]
        top: usize,
        /// Files modified within this many days count as recent
        #[arg(long, value_name = "D", default_value_t = dirsleuth_core::scanner::DEFAULT_RECENCY_DAYS)]
        recent_days: u64,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Disable ANSI colour in text output
        #[arg(long)]
        no_color: bool,
    },
    /// List the immediate children of a directory
    Ls {
        /// Directory to list (defaults to the current directory)
        path: Option<PathBuf>,
        /// Sort key
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Reverse the sort order
        #[arg(long)]
        reverse: bool,
        /// Print paths relative to the listed directory
        #[arg(long)]
        relative: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Mtime,
    Size,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortBy::Name,
            SortArg::Mtime => SortBy::Mtime,
            SortArg::Size => SortBy::Size,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Stats {
            path,
            follow_symlinks,
            top,
            recent_days,
            format,
            no_color,
        } => {
            let options = ScanOptions::default()
                .with_follow_symlinks(follow_symlinks)
                .with_top_n(top)
                .with_recency_days(recent_days);
            run_stats(path, &options, format, no_color)
        }
        Commands::Ls {
            path,
            sort,
            reverse,
            relative,
        } => run_ls(path, sort.map(SortBy::from), reverse, relative),
    }
}

/// The base directory named on the command line, or the working directory.
fn base_dir(path: Option<PathBuf>) -> Result<BaseDir> {
    match path {
        Some(path) => {
            BaseDir::new(&path).with_context(|| format!("cannot open {}", path.display()))
        }
        None => BaseDir::current().context("cannot open the current directory"),
    }
}

fn run_stats(
    path: Option<PathBuf>,
    options: &ScanOptions,
    format: Format,
    no_color: bool,
) -> Result<()> {
    let base = base_dir(path)?;
    let summary = base
        .stats(options)
        .with_context(|| format!("scan of {} failed", base.path().display()))?;

    let stdout = io::stdout();
    match format {
        Format::Text => {
            let style = if no_color || !stdout.is_terminal() {
                TextStyle::plain()
            } else {
                TextStyle::colored()
            };
            writeln!(stdout.lock(), "{}", report::render_text(&summary, &style))?;
        }
        Format::Json => {
            let json = report::render_json(&summary).context("failed to encode summary as JSON")?;
            writeln!(stdout.lock(), "{json}")?;
        }
        Format::Csv => {
            report::write_extensions_csv(&summary, &options.categories, stdout.lock())
                .context("failed to write CSV")?;
        }
    }
    Ok(())
}

fn run_ls(path: Option<PathBuf>, sort: Option<SortBy>, reverse: bool, relative: bool) -> Result<()> {
    let base = base_dir(path)?;
    let entries = base
        .scan("", sort, reverse, relative)
        .with_context(|| format!("listing {} failed", base.path().display()))?;

    let mut out = io::stdout().lock();
    for entry in entries {
        writeln!(out, "{}", entry.display())?;
    }
    Ok(())
}
