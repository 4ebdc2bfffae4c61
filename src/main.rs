//! Cleasy: find what fills your disk.
//!
//! Thin binary entry point. All logic lives in the `cleasy-core` crate; this
//! scans one directory and prints its largest entries.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use cleasy_core::model::size::{format_count, format_size};
use cleasy_core::scanner::{start_scan, FsLister, IgnoreList, ProgressTally, ScanOptions};

/// Minimum time between progress log lines while the scan runs.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "cleasy")]
#[command(about = "Scan a directory tree and list what takes up the space")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// File of paths or glob patterns to skip, one per line
    #[arg(short = 'i', long = "ignore-file", value_name = "FILE")]
    ignore_file: Option<PathBuf>,

    /// Hide directories smaller than this many bytes
    #[arg(short = 'p', long = "prune", value_name = "BYTES", default_value = "0")]
    prune: u64,

    /// Worker threads (default: number of CPUs)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Maximum directory listings in flight (default: twice the CPUs)
    #[arg(long = "max-in-flight")]
    max_in_flight: Option<usize>,

    /// Number of top-level entries to print
    #[arg(short = 'n', long = "top", default_value = "20")]
    top: usize,
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    // Ignore patterns are matched against absolute paths.
    let root = std::fs::canonicalize(&args.path)
        .with_context(|| format!("cannot resolve {}", args.path.display()))?;
    let ignore = match &args.ignore_file {
        Some(file) => IgnoreList::from_file(file)?,
        None => IgnoreList::default(),
    };

    let defaults = ScanOptions::default();
    let options = ScanOptions {
        threads: args.threads.unwrap_or(defaults.threads),
        max_in_flight: args.max_in_flight.unwrap_or(defaults.max_in_flight),
        prune_threshold: args.prune,
    };

    let handle = start_scan(root, FsLister, ignore, options)?;
    let mut tally = ProgressTally::new();
    let mut last_report = Instant::now();
    while !tally.finished {
        tally.absorb_timeout(&handle.progress_rx, POLL_INTERVAL);
        if !tally.finished && last_report.elapsed() >= POLL_INTERVAL {
            tracing::info!("{} directories found so far", tally.dirs_discovered);
            last_report = Instant::now();
        }
    }
    let tree = handle.join()?;

    let root_entry = tree.root_entry();
    println!(
        "{}  {}  ({} files)",
        root_entry.full_path.display(),
        format_size(root_entry.size),
        format_count(root_entry.descendant_count)
    );
    for &child in tree.children(tree.root).iter().take(args.top) {
        let entry = tree.node(child);
        let suffix = if entry.is_dir { "/" } else { "" };
        println!(
            "{:>10}  {:>12}  {}{}",
            format_size(entry.size),
            format_count(entry.file_count()),
            entry.name,
            suffix
        );
    }

    Ok(())
}
