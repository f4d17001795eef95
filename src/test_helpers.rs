//! Shared test utilities for the miniature test suite.
//!
//! Fixture builders for folders of fake videos and scripted metadata
//! tracks, used together with
//! [`MockBackend`](crate::media::backend::tests::MockBackend).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch_files(tmp.path(), &["a.mp4", "notes.txt"]);
//!
//! let backend = MockBackend::new()
//!     .with_metadata("a.mp4", vec![recorded_track("15/06/2023 14:30")]);
//! ```

use crate::media::{Frame, MetadataTrack};
use image::{Rgb, RgbImage};
use std::path::Path;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create each named file in `dir` with placeholder content.
///
/// The content is never decoded: the mock backend decides what a "video"
/// contains.
pub fn touch_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"not really a video").unwrap();
    }
}

/// Set a file's modification time to `secs` after the Unix epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    let time = std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs);
    file.set_modified(time).unwrap();
}

// =========================================================================
// Metadata tracks
// =========================================================================

/// A container-level track with a single tag.
pub fn general_track(key: &str, value: &str) -> MetadataTrack {
    MetadataTrack::new("General").with_tag(key, value)
}

/// A container-level track carrying `recorded_date`.
pub fn recorded_track(value: &str) -> MetadataTrack {
    general_track("recorded_date", value)
}

// =========================================================================
// Frames
// =========================================================================

/// A solid-colour frame.
pub fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Frame {
    Frame::new(RgbImage::from_pixel(width, height, Rgb(color))).unwrap()
}
