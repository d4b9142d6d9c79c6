//! # CLI Module
//!
//! Command-line interface for the remote photo duplicate detector.
//!
//! ## Usage
//! ```bash
//! # Detect duplicates across the records in photos.csv
//! photo-dedup-remote run photos.csv
//!
//! # With a custom threshold and pool size
//! photo-dedup-remote run photos.csv --threshold 2 --workers 20
//!
//! # JSON output
//! photo-dedup-remote run photos.csv --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_dedup_remote::core::engine::{DedupEngine, DedupResult, EngineConfig};
use photo_dedup_remote::core::fetcher::{FetchConfig, HttpFetcher};
use photo_dedup_remote::core::{report, source};
use photo_dedup_remote::error::{DedupError, Result};
use photo_dedup_remote::events::{EngineEvent, Event, EventChannel, FetchEvent};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Remote Photo Dedup - find duplicate uploads across image URLs
#[derive(Parser, Debug)]
#[command(name = "photo-dedup-remote")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run duplicate detection over a CSV of image records
    Run {
        /// Input CSV: id, store_id, frontliner_id, photo_url (header row skipped)
        input: PathBuf,

        /// Output CSV for duplicate groups
        #[arg(long, default_value = "duplicates.csv")]
        duplicates: PathBuf,

        /// Output CSV for failed downloads
        #[arg(long, default_value = "failed_downloads.csv")]
        failed: PathBuf,

        /// Duplicate distance threshold (distance strictly below counts)
        #[arg(short, long, default_value = "1")]
        threshold: u32,

        /// Worker pool size
        #[arg(short, long, default_value = "10")]
        workers: usize,

        /// Per-request HTTP timeout in seconds
        #[arg(long, default_value = "180")]
        timeout_secs: u64,

        /// Download attempts per URL
        #[arg(long, default_value = "3")]
        retries: u32,

        /// Backoff between attempts in seconds
        #[arg(long, default_value = "120")]
        backoff_secs: u64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (duplicate ids only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    photo_dedup_remote::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            duplicates,
            failed,
            threshold,
            workers,
            timeout_secs,
            retries,
            backoff_secs,
            output,
            verbose,
        } => run_detect(
            input,
            duplicates,
            failed,
            EngineConfig {
                workers,
                threshold,
                fetch: FetchConfig {
                    timeout: Duration::from_secs(timeout_secs),
                    max_attempts: retries,
                    backoff: Duration::from_secs(backoff_secs),
                },
            },
            output,
            verbose,
        ),
    }
}

fn run_detect(
    input: PathBuf,
    duplicates_path: PathBuf,
    failed_path: PathBuf,
    config: EngineConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    if config.workers == 0 {
        return Err(DedupError::Config("workers must be at least 1".to_string()));
    }
    if config.fetch.max_attempts == 0 {
        return Err(DedupError::Config("retries must be at least 1".to_string()));
    }

    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Remote Photo Dedup").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let records = source::read_records(&input)?;
    let total = records.len();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let fetcher = HttpFetcher::new(config.fetch.clone()).with_events(sender.clone());
    let engine = DedupEngine::with_fetcher(fetcher, config);

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose_clone = verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Engine(EngineEvent::RecordFinished {
                    id,
                    outcome,
                    completed,
                    ..
                }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(completed as u64);
                        if verbose_clone {
                            pb.set_message(format!("record {id}: {outcome}"));
                        }
                    }
                }
                Event::Fetch(FetchEvent::Retrying { url, attempt, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        if verbose_clone {
                            pb.set_message(format!("retrying {url} (attempt {attempt})"));
                        }
                    }
                }
                Event::Engine(EngineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the engine
    let result = engine.run_with_events(records, &sender);

    // Drop all senders (the engine holds one inside the fetcher) so the
    // event thread finishes
    drop(sender);
    drop(engine);
    event_thread.join().ok();

    // Write the reports before printing: unwritable output is fatal
    report::export_duplicates(&result.duplicates, &duplicates_path)?;
    report::export_failed(&result.failed, &failed_path)?;

    match output {
        OutputFormat::Pretty => {
            print_pretty_results(&term, &result, &duplicates_path, &failed_path, verbose)
        }
        OutputFormat::Json => print_json_results(&result),
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

fn print_pretty_results(
    term: &Term,
    result: &DedupResult,
    duplicates_path: &Path,
    failed_path: &Path,
    verbose: bool,
) {
    term.write_line("").ok();
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} records processed in {:.1}s",
        style(result.stats.total_records).cyan(),
        result.stats.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} duplicate groups found",
        style(result.duplicates.len()).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} unique photos registered",
        style(result.stats.registered).cyan()
    ))
    .ok();

    term.write_line(&format!(
        "  {} failed downloads",
        style(result.stats.failed).yellow()
    ))
    .ok();

    if result.stats.hash_dropped > 0 {
        term.write_line(&format!(
            "  {} records dropped after fingerprint failures",
            style(result.stats.hash_dropped).red()
        ))
        .ok();
    }

    term.write_line("").ok();

    if result.duplicates.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in result.duplicates.iter().enumerate() {
            term.write_line(&format!(
                "  {} frontliner {} ({} collision{})",
                style(format!("Group {}:", i + 1)).bold(),
                style(&group.frontliner_id).yellow(),
                group.collision_count(),
                if group.collision_count() == 1 { "" } else { "s" },
            ))
            .ok();

            for (id, url) in group.duplicate_ids.iter().zip(&group.duplicate_image_urls) {
                term.write_line(&format!("    {} {} {}", style("○").dim(), id, style(url).dim()))
                    .ok();
            }

            term.write_line("").ok();
        }
    }

    if verbose && !result.failed.is_empty() {
        term.write_line(&format!("{}", style("Failed Downloads:").bold().underlined()))
            .ok();
        for record in &result.failed {
            term.write_line(&format!(
                "  {} {} - {}",
                style("✗").red(),
                record.photo_url,
                style(&record.reason).dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style(format!(
            "Reports written to {} and {}",
            duplicates_path.display(),
            failed_path.display()
        ))
        .dim()
    ))
    .ok();
}

fn print_json_results(result: &DedupResult) {
    let output = serde_json::json!({
        "stats": &result.stats,
        "duplicate_groups": &result.duplicates,
        "failed_downloads": &result.failed,
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn print_minimal_results(result: &DedupResult) {
    for group in &result.duplicates {
        for id in &group.duplicate_ids {
            println!("{id}");
        }
    }
}
