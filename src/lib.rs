//! # Miniature
//!
//! Turns a folder of videos into dated JPEG thumbnails. For every video
//! directly inside the folder, the first frame is extracted, the capture
//! date is burned into its top-left corner, and the result is saved as
//! `Miniature/<video-name>.jpg` with the same date in its EXIF
//! `DateTimeOriginal` and `DateTimeDigitized` fields. Photo managers then sort
//! the thumbnails next to the photos taken at the same moment.
//!
//! # Pipeline
//!
//! ```text
//! folder ─► scan ─► for each video:
//!                     timestamp::resolve     container date → file mtime → now
//!                     MediaBackend::first_frame
//!                     OverlayRenderer::composite
//!                     imaging::persist        JPEG + EXIF dates
//!                   ─► BatchResult
//! ```
//!
//! Items run one at a time. A failing video is counted and skipped; it never
//! aborts the batch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists eligible videos in a folder, sorted by name |
//! | [`timestamp`] | Resolves a video's capture date through a fallback chain |
//! | [`media`] | `MediaBackend` trait; ffprobe metadata and ffmpeg first-frame decode |
//! | [`imaging`] | Caption overlay, JPEG encoding, EXIF date writing and reading |
//! | [`process`] | Batch orchestration, per-item reports, counters, progress events |
//! | [`config`] | Fixed constants: extensions, folder name, font, colours, quality |
//! | [`output`] | CLI formatting of progress and the final summary |
//!
//! # Design Decisions
//!
//! ## External ffmpeg, Pure-Rust Everything Else
//!
//! Decoding arbitrary video containers is left to `ffmpeg`/`ffprobe`, called
//! as subprocesses behind the [`media::MediaBackend`] trait. Text rendering,
//! JPEG encoding and EXIF writing are pure Rust, so the only runtime
//! dependency is the ffmpeg package.
//!
//! ## Wall-Clock Dates
//!
//! Container dates are taken as local wall-clock time. A `UTC` marker or an
//! explicit offset is not converted: the thumbnail shows the clock reading
//! stored in the file, which is what the camera displayed.

pub mod config;
pub mod imaging;
pub mod media;
pub mod output;
pub mod process;
pub mod scan;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod test_helpers;
