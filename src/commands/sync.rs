//! `highlight-export sync` command - fetch highlights and write notes

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use serde::Serialize;

use highlight_export_core::codec::MarkdownCodec;
use highlight_export_core::config::Config;
use highlight_export_core::error::{ExportError, Result};
use highlight_export_core::export::Exporter;
use highlight_export_core::source::{HighlightSource, JsonFileSource, ReadeckClient};
use highlight_export_core::store::{NoteOutcome, NoteRepository, OperationKind, SyncReport};

use crate::cli::{Cli, OutputFormat, SyncArgs};

#[derive(Debug, Serialize)]
struct Summary<'a> {
    processed: usize,
    created: usize,
    updated: usize,
    unchanged: usize,
    failed: usize,
    highlights: usize,
    new_highlights: usize,
    #[serde(flatten)]
    report: &'a SyncReport,
}

impl<'a> Summary<'a> {
    fn new(report: &'a SyncReport) -> Self {
        Summary {
            processed: report.outcomes.len(),
            created: report.count(OperationKind::Created),
            updated: report.count(OperationKind::Updated),
            unchanged: report.count(OperationKind::Unchanged),
            failed: report.failures.len(),
            highlights: report.total(),
            new_highlights: report.added(),
            report,
        }
    }
}

/// Execute the sync command
pub fn execute(
    cli: &Cli,
    config: &Config,
    args: &SyncArgs,
    cancel: &AtomicBool,
    start: Instant,
) -> Result<()> {
    config.validate_for_sync(args.input.is_none())?;
    let notes_dir = config
        .export
        .notes_dir
        .clone()
        .ok_or_else(|| ExportError::InvalidConfig {
            reason: "export.notes_dir is not set".to_string(),
        })?;

    let codec = MarkdownCodec::new(config.colors.clone(), config.export.base_tags.clone());
    let repository = NoteRepository::new(notes_dir, config.export.extension.clone(), codec);

    let report = match &args.input {
        Some(path) => {
            tracing::info!(input = %path.display(), "syncing from export file");
            run(&JsonFileSource::open(path)?, &repository, cancel)?
        }
        None => {
            tracing::info!(base_url = %config.readeck.base_url, "syncing from server");
            run(&ReadeckClient::new(config.readeck_settings()), &repository, cancel)?
        }
    };

    if args.timing {
        eprintln!("sync: {:?}", start.elapsed());
    }

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Summary::new(&report))?);
        }
        OutputFormat::Human => print_human(cli, &report),
    }

    if report.has_failures() {
        return Err(ExportError::Other(format!(
            "{} note(s) could not be synced",
            report.failures.len()
        )));
    }
    Ok(())
}

fn run<S: HighlightSource>(
    source: &S,
    repository: &NoteRepository<MarkdownCodec>,
    cancel: &AtomicBool,
) -> Result<SyncReport> {
    Exporter::new(source, repository).export(cancel)
}

fn print_human(cli: &Cli, report: &SyncReport) {
    for failure in &report.failures {
        eprintln!("failed: {} ({}): {}", failure.title, failure.bookmark_id, failure.error);
    }
    if cli.quiet {
        return;
    }

    let summary = Summary::new(report);
    println!(
        "Processed {} notes: {} created, {} updated, {} unchanged",
        summary.processed, summary.created, summary.updated, summary.unchanged
    );
    println!(
        "Highlights: {} total, {} new",
        summary.highlights, summary.new_highlights
    );

    for outcome in &report.outcomes {
        if outcome.kind != OperationKind::Unchanged || cli.verbose {
            println!("  {}", describe(outcome));
        }
    }

    if !report.skipped.is_empty() {
        println!("Skipped {} unparseable note(s)", report.skipped.len());
        if cli.verbose {
            for skipped in &report.skipped {
                println!("  {}: {}", skipped.path.display(), skipped.reason);
            }
        }
    }
    if report.cancelled {
        println!("Sync cancelled; remaining bookmarks were not processed");
    }
}

fn describe(outcome: &NoteOutcome) -> String {
    let mut line = format!("{:<9} {}", outcome.kind, outcome.path.display());
    if outcome.added > 0 {
        let colors: Vec<String> = outcome
            .colors
            .iter()
            .map(|(color, count)| format!("{} {}", color, count))
            .collect();
        line.push_str(&format!(" (+{}: {})", outcome.added, colors.join(", ")));
    }
    line
}
