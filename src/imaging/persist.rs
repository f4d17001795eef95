//! JPEG output with embedded capture dates.
//!
//! Two passes: the composited frame is encoded with the `image` crate's
//! JPEG encoder, then the file is re-read and the EXIF APP1 segment from
//! [`exif_writer`](super::exif_writer) is spliced in. Reading the dates back
//! goes through `kamadak-exif`, which is also what the tests use to check
//! what was written.

use super::exif_writer::{self, ExifError};
use super::overlay::CompositedImage;
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("EXIF embedding failed: {0}")]
    Exif(#[from] ExifError),
    #[error("EXIF read failed: {0}")]
    Read(String),
}

/// Write `image` to `dest` as a JPEG carrying `timestamp` as
/// DateTimeOriginal and DateTimeDigitized. Overwrites `dest`.
pub fn persist(
    image: &CompositedImage,
    dest: &Path,
    timestamp: &str,
    quality: Quality,
) -> Result<(), PersistError> {
    save_jpeg(image, dest, quality)?;
    embed_exif_dates(dest, timestamp)
}

fn save_jpeg(image: &CompositedImage, path: &Path, quality: Quality) -> Result<(), PersistError> {
    let img = image.as_image();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.as_u8());
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
    writer.flush()?;
    Ok(())
}

/// Rewrite the JPEG at `path` with both date tags set to `timestamp`.
pub fn embed_exif_dates(path: &Path, timestamp: &str) -> Result<(), PersistError> {
    let jpeg = std::fs::read(path)?;
    let payload = exif_writer::build_date_payload(timestamp);
    let updated = exif_writer::insert_app1(&jpeg, &payload)?;
    std::fs::write(path, updated)?;
    Ok(())
}

/// Capture dates read back from a JPEG's EXIF block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifDates {
    pub original: Option<String>,
    pub digitized: Option<String>,
}

/// Read DateTimeOriginal and DateTimeDigitized from a JPEG.
pub fn read_exif_dates(path: &Path) -> Result<ExifDates, PersistError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| PersistError::Read(e.to_string()))?;

    let ascii = |tag: exif::Tag| -> Option<String> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        match &field.value {
            exif::Value::Ascii(values) => values
                .first()
                .and_then(|v| String::from_utf8(v.clone()).ok()),
            _ => None,
        }
    };

    Ok(ExifDates {
        original: ascii(exif::Tag::DateTimeOriginal),
        digitized: ascii(exif::Tag::DateTimeDigitized),
    })
}
