//! Thumbnail imaging: caption overlay and JPEG output with EXIF dates.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Caption** | `imageproc::drawing::draw_text_mut` + `ab_glyph` TrueType, bitmap fallback |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` |
//! | **EXIF dates** | custom APP1 writer (TIFF IFD0 → Exif IFD) |
//! | **Read dates back** | `kamadak-exif` |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`]
//! - **Overlay**: [`OverlayRenderer`] and the [`CompositedImage`] it produces
//! - **Built-in font**: 5×7 bitmap glyphs used when no font file loads
//! - **EXIF writer**: byte-level TIFF/APP1 construction and splicing
//! - **Persist**: [`persist`] and [`read_exif_dates`]

mod builtin_font;
pub(crate) mod exif_writer;
pub mod overlay;
mod params;
pub mod persist;

pub use exif_writer::ExifError;
pub use overlay::{CompositedImage, FontError, OverlayRenderer};
pub use params::Quality;
pub use persist::{ExifDates, PersistError, embed_exif_dates, persist, read_exif_dates};
