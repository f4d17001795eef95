//! Media backend trait and shared types.
//!
//! The [`MediaBackend`] trait covers the two things the pipeline needs from a
//! video container: its metadata tracks (for the creation date) and its first
//! decodable frame (for the thumbnail).
//!
//! The production implementation is
//! [`FfmpegBackend`](super::ffmpeg_backend::FfmpegBackend), which shells out to
//! `ffprobe` and `ffmpeg`. Tests use the recording `MockBackend` below.

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Container metadata could not be read. Never user-visible: the resolver
/// falls back to file times.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to run metadata probe: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Metadata probe failed: {0}")]
    Failed(String),
    #[error("Unreadable probe output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why no frame came out of a video.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Cannot open {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("No decodable frame in {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("Frame conversion failed for {}: {reason}", .path.display())]
    Conversion { path: PathBuf, reason: String },
}

/// Logical date fields, in the order the resolver tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    Recorded,
    Creation,
    Encoded,
    Tagged,
}

impl DateField {
    pub const PRIORITY: [DateField; 4] = [
        DateField::Recorded,
        DateField::Creation,
        DateField::Encoded,
        DateField::Tagged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DateField::Recorded => "recorded_date",
            DateField::Creation => "creation_date",
            DateField::Encoded => "encoded_date",
            DateField::Tagged => "tagged_date",
        }
    }

    /// Raw tag keys that carry this field, most specific first.
    ///
    /// The first entry is the MediaInfo-style name; the rest are what
    /// ffprobe reports for the common containers (QuickTime/MP4, Matroska).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            DateField::Recorded => &[
                "recorded_date",
                "date_recorded",
                "com.apple.quicktime.creationdate",
                "date",
            ],
            DateField::Creation => &["creation_date", "creation_time"],
            DateField::Encoded => &["encoded_date", "date_encoded"],
            DateField::Tagged => &["tagged_date", "date_tagged"],
        }
    }
}

/// One metadata track of a container: the container-level (general) track
/// or one of its streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTrack {
    pub kind: String,
    pub tags: Vec<(String, String)>,
}

impl MetadataTrack {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Value of `field` on this track, if any alias carries a non-empty value.
    pub fn field(&self, field: DateField) -> Option<&str> {
        field.aliases().iter().find_map(|alias| {
            self.tags
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(alias))
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        })
    }
}

/// A decoded RGB frame. Width and height are always non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap a raster, rejecting empty ones.
    pub fn new(image: RgbImage) -> Option<Self> {
        (image.width() > 0 && image.height() > 0).then_some(Self { image })
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Trait for media backends.
pub trait MediaBackend {
    /// Read the container's metadata tracks, general track first.
    fn probe_tracks(&self, path: &Path) -> Result<Vec<MetadataTrack>, ProbeError>;

    /// Decode the first frame in stream order and release the decoder.
    fn first_frame(&self, path: &Path) -> Result<Frame, ExtractError>;
}
