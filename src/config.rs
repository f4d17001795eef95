//! Fixed pipeline constants.
//!
//! Nothing here is read from disk or the command line: the extension set,
//! the output folder name, the overlay font and its styling are all baked
//! in at build time. They are grouped into [`PipelineConfig`] and
//! [`OverlayStyle`] so tests can point the font somewhere else, but the
//! `Default` impls are the only values the binary ever uses.
//!
//! ```text
//! extensions     .mp4 .avi .mov .mkv .flv .wmv .webm .mpeg .mpg .m4v .3gp
//! output folder  Miniature/
//! font           arial.ttf, 75px, white on a 2px black outline, at (15, 15)
//! jpeg quality   75
//! ```

use crate::imaging::Quality;
use image::Rgb;
use std::path::{Path, PathBuf};

/// Video extensions (lower-case, without the dot) eligible for thumbnailing.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "flv", "wmv", "webm", "mpeg", "mpg", "m4v", "3gp",
];

/// Subfolder created inside the input directory to hold the thumbnails.
pub const OUTPUT_SUBFOLDER_NAME: &str = "Miniature";

pub const FONT_FILE_NAME: &str = "arial.ttf";
pub const FONT_SIZE: f32 = 75.0;
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const TEXT_OUTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
pub const OUTLINE_THICKNESS: i32 = 2;
pub const TEXT_POSITION: (i32, i32) = (15, 15);
pub const JPEG_QUALITY: u32 = 75;

/// Whether `ext` (any case, no leading dot) is a recognized video extension.
pub fn is_video_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    VIDEO_EXTENSIONS.contains(&lower.as_str())
}

/// Where and how the date caption is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Top-left anchor of the caption, in pixels.
    pub position: (i32, i32),
    /// Glyph height in pixels.
    pub font_size: f32,
    pub text_color: Rgb<u8>,
    pub outline_color: Rgb<u8>,
    /// Outline reach in pixels on each axis.
    pub outline_thickness: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            position: TEXT_POSITION,
            font_size: FONT_SIZE,
            text_color: TEXT_COLOR,
            outline_color: TEXT_OUTLINE_COLOR,
            outline_thickness: OUTLINE_THICKNESS,
        }
    }
}

/// Everything the batch needs that is not the input directory itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_subfolder: String,
    pub font_path: PathBuf,
    pub overlay: OverlayStyle,
    pub jpeg_quality: Quality,
}

impl PipelineConfig {
    /// Output directory for a given input directory.
    pub fn output_dir(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(&self.output_subfolder)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_subfolder: OUTPUT_SUBFOLDER_NAME.to_string(),
            font_path: resource_path(FONT_FILE_NAME),
            overlay: OverlayStyle::default(),
            jpeg_quality: Quality::new(JPEG_QUALITY),
        }
    }
}

/// Locate a bundled resource file.
///
/// Looks next to the running executable first (installed layout), then in
/// the current directory. When neither exists the current-directory path is
/// returned so the caller's load error names a sensible location.
pub fn resource_path(relative: &str) -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(relative)));
    if let Some(path) = beside_exe.filter(|p| p.is_file()) {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(relative))
        .unwrap_or_else(|_| PathBuf::from(relative))
}
