//! CLI output formatting for batch progress and the final report.
//!
//! # Information-First Display
//!
//! Every video leads with its positional index and file name; the resolved
//! date and the outcome follow as indented context lines. The final summary
//! mirrors the report a desktop front end would show: folders, counters, and
//! the files whose date came from a fallback.
//!
//! # Output Format
//!
//! ## Progress
//!
//! ```text
//! 3 videos → Holiday/Miniature
//!     001 beach.mp4
//!         Date: 2023:06:15 14:30:00 (recorded_date)
//!         Thumbnail: Holiday/Miniature/beach.jpg
//!     002 dinner.MOV
//!         Date: 2023:06:15 19:02:11 (file modified, fallback)
//!         Thumbnail: Holiday/Miniature/dinner.jpg
//!     003 broken.mkv
//!         Date: 2024:01:02 08:00:00 (file modified, fallback)
//!         Failed: cannot open
//! ```
//!
//! ## Summary
//!
//! ```text
//! Source folder:    Holiday
//! Thumbnail folder: Holiday/Miniature
//! Videos found:     3
//! Created:          2
//! Fallback dates:   2
//! Failed:           1
//!
//! Fallback date used for:
//!     dinner.MOV
//!     broken.mkv
//!
//! Failures:
//!     broken.mkv: Cannot open video ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::process::{BatchResult, ItemOutcome, ItemReport, ProcessEvent};
use crate::timestamp::{ResolvedTimestamp, TimestampSource};

/// Fallback names listed before collapsing the rest into a count.
pub const MAX_LISTED_FALLBACKS: usize = 15;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Where the date came from, as shown after the date itself.
fn source_label(timestamp: &ResolvedTimestamp) -> String {
    match timestamp.source {
        TimestampSource::Metadata { field } => field.name().to_string(),
        TimestampSource::FileModified => "file modified, fallback".to_string(),
        TimestampSource::Now => "current time, fallback".to_string(),
    }
}

fn item_lines(index: usize, report: &ItemReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} {}",
        indent(1),
        format_index(index),
        report.name
    )];
    lines.push(format!(
        "{}Date: {} ({})",
        indent(2),
        report.timestamp.text,
        source_label(&report.timestamp)
    ));
    match &report.outcome {
        ItemOutcome::Created { thumbnail } => {
            lines.push(format!("{}Thumbnail: {}", indent(2), thumbnail.display()));
        }
        ItemOutcome::Failed { kind, .. } => {
            lines.push(format!("{}Failed: {}", indent(2), kind.label()));
        }
    }
    lines
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
///
/// `ItemStarted` produces nothing: the item is shown once it is finished,
/// together with its outcome.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total, output_dir } => vec![format!(
            "{} → {}",
            plural(*total, "video", "videos"),
            output_dir.display()
        )],
        ProcessEvent::ItemStarted { .. } => Vec::new(),
        ProcessEvent::ItemFinished { index, report } => item_lines(*index, report),
        ProcessEvent::Stopped { remaining } => vec![format!(
            "Stopped: {} not processed",
            plural(*remaining, "video", "videos")
        )],
    }
}

// ============================================================================
// Summary
// ============================================================================

/// List `names`, showing at most `max` and summarising the rest.
fn capped_list(names: &[String], max: usize) -> Vec<String> {
    let mut lines: Vec<String> = names
        .iter()
        .take(max)
        .map(|n| format!("{}{}", indent(1), n))
        .collect();
    if names.len() > max {
        lines.push(format!("{}...and {} more", indent(1), names.len() - max));
    }
    lines
}

/// Format the end-of-batch report.
pub fn format_summary(result: &BatchResult) -> Vec<String> {
    if result.total_found == 0 {
        return vec![format!(
            "No compatible video files found in {}",
            result.source_dir.display()
        )];
    }

    let mut lines = vec![
        format!("Source folder:    {}", result.source_dir.display()),
        format!("Thumbnail folder: {}", result.output_dir.display()),
        format!("Videos found:     {}", result.total_found),
        format!("Created:          {}", result.succeeded),
        format!("Fallback dates:   {}", result.fallback_count),
        format!("Failed:           {}", result.failed_count),
    ];

    if result.stopped_early {
        lines.push(format!(
            "Stopped early:    {} not processed",
            result.total_found - result.processed()
        ));
    }

    if !result.fallback_file_names.is_empty() {
        lines.push(String::new());
        lines.push("Fallback date used for:".to_string());
        lines.extend(capped_list(
            &result.fallback_file_names,
            MAX_LISTED_FALLBACKS,
        ));
    }

    if !result.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failures:".to_string());
        for failure in &result.failures {
            lines.push(format!("{}{}: {}", indent(1), failure.name, failure.message));
        }
    }

    lines
}

pub fn print_summary(result: &BatchResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}
