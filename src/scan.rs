//! Video discovery.
//!
//! Lists the files directly inside the input directory (no recursion) and
//! keeps those whose extension is in [`VIDEO_EXTENSIONS`](crate::config::VIDEO_EXTENSIONS).
//!
//! ```text
//! holiday/
//! ├── 001.MP4          ✓  eligible (extension match is case-insensitive)
//! ├── clip.mkv         ✓
//! ├── notes.txt        ✗  not a video extension
//! ├── .clip.mp4        ✓  dot-files are not special
//! ├── raw.mov/         ✗  directory
//! └── Miniature/       ✗  directory (our own output)
//! ```
//!
//! Entries are sorted by file name so two runs over the same folder visit
//! items in the same order and produce the same output.

use crate::config;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// One eligible video, as enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoItem {
    pub path: PathBuf,
    /// Lower-cased extension without the dot.
    pub extension: String,
}

impl VideoItem {
    /// Build an item from a path, if its extension is a recognized video one.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        // Text after the last dot, so a bare ".mp4" still counts as a video
        let extension = {
            let name = path.file_name()?.to_string_lossy();
            name.rsplit_once('.')?.1.to_ascii_lowercase()
        };
        if !config::is_video_extension(&extension) {
            return None;
        }
        Some(Self { path, extension })
    }

    /// File name with extension, as shown in reports.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension; the thumbnail is `<stem>.jpg`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn thumbnail_name(&self) -> String {
        format!("{}.jpg", self.stem())
    }
}

/// Enumerate eligible videos directly inside `dir`, sorted by file name.
pub fn scan_videos(dir: &Path) -> Result<Vec<VideoItem>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut items: Vec<VideoItem> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(VideoItem::from_path)
        .collect();

    items.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"not really a video").unwrap();
    }

    fn names(items: &[VideoItem]) -> Vec<String> {
        items.iter().map(VideoItem::name).collect()
    }

    #[test]
    fn finds_only_video_extensions() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.mp4");
        touch(tmp.path(), "b.mkv");
        touch(tmp.path(), "c.3gp");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "cover.jpg");

        let items = scan_videos(tmp.path()).unwrap();
        assert_eq!(names(&items), vec!["a.mp4", "b.mkv", "c.3gp"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "CLIP.MOV");
        touch(tmp.path(), "other.WebM");

        let items = scan_videos(tmp.path()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].extension, "mov");
        assert_eq!(items[1].extension, "webm");
    }

    #[test]
    fn does_not_recurse() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "top.mp4");
        let nested = tmp.path().join("nested");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "deep.mp4");

        let items = scan_videos(tmp.path()).unwrap();
        assert_eq!(names(&items), vec!["top.mp4"]);
    }

    #[test]
    fn directories_with_video_names_are_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("folder.mp4")).unwrap();
        fs::create_dir(tmp.path().join("Miniature")).unwrap();

        assert!(scan_videos(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn dot_files_with_video_extension_are_found() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), ".partial.mp4");
        touch(tmp.path(), "visible.mp4");
        touch(tmp.path(), ".DS_Store");
        touch(tmp.path(), ".MOV");

        let items = scan_videos(tmp.path()).unwrap();
        assert_eq!(names(&items), vec![".MOV", ".partial.mp4", "visible.mp4"]);
        assert_eq!(items[0].thumbnail_name(), ".MOV.jpg");
        assert_eq!(items[1].thumbnail_name(), ".partial.jpg");
    }

    #[test]
    fn items_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "c.mp4");
        touch(tmp.path(), "a.mp4");
        touch(tmp.path(), "b.mp4");

        let items = scan_videos(tmp.path()).unwrap();
        assert_eq!(names(&items), vec!["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_videos(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_videos(&tmp.path().join("absent"));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn file_without_extension_is_not_eligible() {
        assert!(VideoItem::from_path(PathBuf::from("/v/README")).is_none());
    }

    #[test]
    fn thumbnail_name_replaces_extension() {
        let item = VideoItem::from_path(PathBuf::from("/v/holiday.2023.MP4")).unwrap();
        assert_eq!(item.name(), "holiday.2023.MP4");
        assert_eq!(item.stem(), "holiday.2023");
        assert_eq!(item.thumbnail_name(), "holiday.2023.jpg");
    }
}
