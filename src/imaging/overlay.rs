//! Date caption overlay.
//!
//! The caption is drawn with a hard outline so it stays readable on any
//! background:
//!
//! ```text
//! for every (dx, dy) in [-t, t] × [-t, t], except (0, 0):
//!     draw text at (x + dx, y + dy) in the outline colour
//! draw text at (x, y) in the text colour
//! ```
//!
//! With the default thickness of 2 that is 24 outline passes plus the main
//! one.
//!
//! `font_size` is the em size in pixels, as in most desktop toolkits.
//! `ab_glyph` scales by line height (ascent minus descent), so the size is
//! converted with the font's own metrics in [`em_scale`].
//!
//! The TrueType font is loaded once per [`OverlayRenderer`]. When it cannot
//! be loaded the renderer switches to the [built-in bitmap face](super::builtin_font)
//! and logs a single warning; compositing itself never fails.

use super::builtin_font;
use crate::config::OverlayStyle;
use crate::media::Frame;
use ab_glyph::{Font, FontArc, InvalidFont, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use log::warn;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid font data: {0}")]
    Invalid(#[from] InvalidFont),
}

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let bytes = std::fs::read(path)?;
    Ok(FontArc::try_from_vec(bytes)?)
}

/// A frame with the caption burned in.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositedImage {
    image: RgbImage,
}

impl CompositedImage {
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

enum OverlayFont {
    TrueType { font: FontArc, scale: PxScale },
    Builtin,
}

/// Scale at which one em of `font` spans `em_px` pixels.
pub fn em_scale(font: &impl Font, em_px: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) if upem > 0.0 => PxScale::from(em_px * font.height_unscaled() / upem),
        _ => PxScale::from(em_px),
    }
}

/// Offsets at which the outline copy of the caption is drawn.
pub fn outline_offsets(thickness: i32) -> impl Iterator<Item = (i32, i32)> {
    (-thickness..=thickness)
        .flat_map(move |dx| (-thickness..=thickness).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
}

/// Draws outlined captions onto frames.
pub struct OverlayRenderer {
    font: OverlayFont,
    style: OverlayStyle,
}

impl OverlayRenderer {
    /// Load the font at `font_path`, falling back to the built-in face.
    pub fn new(font_path: &Path, style: OverlayStyle) -> Self {
        let font = match load_font(font_path) {
            Ok(font) => {
                let scale = em_scale(&font, style.font_size);
                OverlayFont::TrueType { font, scale }
            }
            Err(e) => {
                warn!(
                    "Font '{}' could not be loaded ({e}); using the built-in font",
                    font_path.display()
                );
                OverlayFont::Builtin
            }
        };
        Self { font, style }
    }

    pub fn with_builtin_font(style: OverlayStyle) -> Self {
        Self {
            font: OverlayFont::Builtin,
            style,
        }
    }

    pub fn uses_builtin_font(&self) -> bool {
        matches!(self.font, OverlayFont::Builtin)
    }

    fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match &self.font {
            OverlayFont::TrueType { font, scale } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text)
            }
            OverlayFont::Builtin => {
                builtin_font::draw_text(canvas, color, x, y, self.style.font_size, text)
            }
        }
    }

    /// Burn `text` into `frame`. Consumes the frame.
    pub fn composite(&self, frame: Frame, text: &str) -> CompositedImage {
        let mut image = frame.into_image();
        let (x, y) = self.style.position;

        for (dx, dy) in outline_offsets(self.style.outline_thickness) {
            self.draw(&mut image, self.style.outline_color, x + dx, y + dy, text);
        }
        self.draw(&mut image, self.style.text_color, x, y, text);

        CompositedImage { image }
    }
}
