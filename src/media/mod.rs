//! Video container access: metadata tracks and first-frame decode.
//!
//! | Operation | Implementation |
//! |---|---|
//! | **Metadata tracks** | `ffprobe` JSON → [`MetadataTrack`]s, general track first |
//! | **First frame** | `ffmpeg` single-frame PPM pipe → [`Frame`] |
//!
//! The module is split into:
//! - **Backend**: [`MediaBackend`] trait, error types, [`Frame`] and [`MetadataTrack`]
//! - **ffmpeg backend**: [`FfmpegBackend`], the production implementation

pub mod backend;
pub mod ffmpeg_backend;

pub use backend::{DateField, ExtractError, Frame, MediaBackend, MetadataTrack, ProbeError};
pub use ffmpeg_backend::FfmpegBackend;
