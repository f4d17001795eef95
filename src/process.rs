//! Batch orchestration: one folder of videos in, one dated JPEG per video out.
//!
//! For each eligible video, in file-name order:
//!
//! ```text
//! resolve timestamp ──► extract first frame ──► composite caption ──► persist JPEG + EXIF
//!        │                      │                                          │
//!   used_fallback?         Open/Decode/Conversion                       Persist
//!        ▼                      ▼                                          ▼
//!  fallback_count++        failed_count++          ◄───────────────  failed_count++
//! ```
//!
//! A failure in one item never stops the batch. Only problems with the
//! folder itself (missing, unreadable, output folder not creatable) are
//! returned as [`ProcessError`].
//!
//! ## Output Structure
//!
//! ```text
//! Holiday/
//! ├── beach.mp4
//! ├── dinner.MOV
//! ├── notes.txt                  # ignored
//! └── Miniature/
//!     ├── beach.jpg              # first frame + "2023:06:15 14:30:00"
//!     └── dinner.jpg
//! ```
//!
//! Progress is reported through an optional [`ProcessEvent`] channel. An
//! optional stop flag is checked between items, never in the middle of one.

use crate::config::PipelineConfig;
use crate::imaging::{self, OverlayRenderer, PersistError};
use crate::media::{ExtractError, FfmpegBackend, MediaBackend};
use crate::scan::{self, ScanError, VideoItem};
use crate::timestamp::{self, ResolvedTimestamp};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Cannot create output folder {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an item produced no thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Open,
    Decode,
    Conversion,
    Persist,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Open => "cannot open",
            FailureKind::Decode => "no frame",
            FailureKind::Conversion => "bad frame",
            FailureKind::Persist => "cannot save",
        }
    }
}

#[derive(Error, Debug)]
enum ItemError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ItemError {
    fn kind(&self) -> FailureKind {
        match self {
            ItemError::Extract(ExtractError::Open { .. }) => FailureKind::Open,
            ItemError::Extract(ExtractError::Decode { .. }) => FailureKind::Decode,
            ItemError::Extract(ExtractError::Conversion { .. }) => FailureKind::Conversion,
            ItemError::Persist(_) => FailureKind::Persist,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Created { thumbnail: PathBuf },
    Failed { kind: FailureKind, message: String },
}

/// Result of running the pipeline on one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub timestamp: ResolvedTimestamp,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Created { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Counters for a whole batch.
///
/// Each recorded item increments exactly one of `succeeded` and
/// `failed_count`. `fallback_count` is independent of both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total_found: usize,
    pub succeeded: usize,
    pub fallback_count: usize,
    pub failed_count: usize,
    /// In processing order.
    pub fallback_file_names: Vec<String>,
    pub failures: Vec<ItemFailure>,
    pub stopped_early: bool,
}

impl BatchResult {
    pub fn new(source_dir: &Path, output_dir: &Path, total_found: usize) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            total_found,
            ..Self::default()
        }
    }

    /// Fold one item's report into the counters.
    pub fn record(&mut self, report: &ItemReport) {
        if report.timestamp.used_fallback {
            self.fallback_count += 1;
            self.fallback_file_names.push(report.name.clone());
        }
        match &report.outcome {
            ItemOutcome::Created { .. } => self.succeeded += 1,
            ItemOutcome::Failed { kind, message } => {
                self.failed_count += 1;
                self.failures.push(ItemFailure {
                    name: report.name.clone(),
                    kind: *kind,
                    message: message.clone(),
                });
            }
        }
    }

    /// Items that went through the pipeline (less than `total_found` when stopped).
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed_count
    }
}

/// Progress events, 1-based indices.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        total: usize,
        output_dir: PathBuf,
    },
    ItemStarted {
        index: usize,
        total: usize,
        name: String,
    },
    ItemFinished {
        index: usize,
        report: ItemReport,
    },
    Stopped {
        remaining: usize,
    },
}

fn emit(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        tx.send(event).ok();
    }
}

/// Run the pipeline on a single video and report what happened.
///
/// Never fails: extraction and persist errors end up in the report.
pub fn process_item(
    backend: &impl MediaBackend,
    renderer: &OverlayRenderer,
    item: &VideoItem,
    output_dir: &Path,
    config: &PipelineConfig,
) -> ItemReport {
    let timestamp = timestamp::resolve(backend, &item.path);
    let dest = output_dir.join(item.thumbnail_name());

    let outcome = match render_thumbnail(backend, renderer, item, &dest, &timestamp, config) {
        Ok(()) => {
            info!("{} → {} ({})", item.name(), dest.display(), timestamp.text);
            ItemOutcome::Created { thumbnail: dest }
        }
        Err(e) => {
            warn!("{}: {e}", item.name());
            ItemOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    };

    ItemReport {
        name: item.name(),
        timestamp,
        outcome,
    }
}

fn render_thumbnail(
    backend: &impl MediaBackend,
    renderer: &OverlayRenderer,
    item: &VideoItem,
    dest: &Path,
    timestamp: &ResolvedTimestamp,
    config: &PipelineConfig,
) -> Result<(), ItemError> {
    let frame = backend.first_frame(&item.path)?;
    let image = renderer.composite(frame, &timestamp.text);
    imaging::persist(&image, dest, &timestamp.text, config.jpeg_quality)?;
    Ok(())
}

/// Process every video directly inside `dir` with the ffmpeg backend.
pub fn process_directory(
    dir: &Path,
    config: &PipelineConfig,
    events: Option<Sender<ProcessEvent>>,
    stop: Option<&AtomicBool>,
) -> Result<BatchResult, ProcessError> {
    let backend = FfmpegBackend::new();
    let renderer = OverlayRenderer::new(&config.font_path, config.overlay.clone());
    process_with_backend(&backend, &renderer, dir, config, events, stop)
}

/// Process a folder using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl MediaBackend,
    renderer: &OverlayRenderer,
    dir: &Path,
    config: &PipelineConfig,
    events: Option<Sender<ProcessEvent>>,
    stop: Option<&AtomicBool>,
) -> Result<BatchResult, ProcessError> {
    let items = scan::scan_videos(dir)?;

    let output_dir = config.output_dir(dir);
    std::fs::create_dir_all(&output_dir).map_err(|source| ProcessError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let total = items.len();
    let mut result = BatchResult::new(dir, &output_dir, total);
    emit(
        &events,
        ProcessEvent::Started {
            total,
            output_dir: output_dir.clone(),
        },
    );

    for (i, item) in items.iter().enumerate() {
        if stop.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            result.stopped_early = true;
            info!("Stopped after {i} of {total} videos");
            emit(&events, ProcessEvent::Stopped { remaining: total - i });
            break;
        }

        emit(
            &events,
            ProcessEvent::ItemStarted {
                index: i + 1,
                total,
                name: item.name(),
            },
        );
        let report = process_item(backend, renderer, item, &output_dir, config);
        result.record(&report);
        emit(&events, ProcessEvent::ItemFinished { index: i + 1, report });
    }

    info!(
        "{} found, {} created, {} fallback dates, {} failed",
        result.total_found, result.succeeded, result.fallback_count, result.failed_count
    );
    Ok(result)
}
