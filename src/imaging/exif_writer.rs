//! Minimal EXIF writer for JPEG files.
//!
//! Writes two tags into the Exif sub-IFD:
//! - DateTimeOriginal (0x9003)
//! - DateTimeDigitized (0x9004)
//!
//! The block is a big-endian TIFF structure wrapped in an APP1 segment:
//!
//! ```text
//! FF E1 <len>  "Exif\0\0"
//!   "MM" 00 2A 00000008            TIFF header
//!   IFD0:     ExifIFDPointer (0x8769, LONG)
//!   Exif IFD: 0x9003, 0x9004 (ASCII, NUL-terminated)
//!   value area
//! ```
//!
//! Insertion replaces any existing Exif APP1 and leaves every other segment
//! and the entropy-coded data untouched. Pure Rust, no dependencies.

use thiserror::Error;

pub const TAG_EXIF_IFD_POINTER: u16 = 0x8769;
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const TAG_DATE_TIME_DIGITIZED: u16 = 0x9004;

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const TIFF_HEADER_LEN: usize = 8;

const MARKER_SOI: u8 = 0xD8;
const MARKER_SOS: u8 = 0xDA;
const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;

/// Largest payload that fits in a segment (length field counts itself).
pub const MAX_SEGMENT_PAYLOAD: usize = 0xFFFF - 2;

#[derive(Error, Debug)]
pub enum ExifError {
    #[error("Data does not start with a JPEG SOI marker")]
    NotJpeg,
    #[error("EXIF segment too large: {0} bytes")]
    SegmentTooLarge(usize),
    #[error("Malformed JPEG segment at offset {0}")]
    Malformed(usize),
}

// ---------------------------------------------------------------------------
// TIFF / IFD serialization
// ---------------------------------------------------------------------------

/// One 12-byte IFD entry plus its value bytes.
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    value: Vec<u8>,
}

impl IfdEntry {
    fn ascii(tag: u16, text: &str) -> Self {
        let mut value = text.as_bytes().to_vec();
        value.push(0);
        Self {
            tag,
            field_type: TYPE_ASCII,
            count: value.len() as u32,
            value,
        }
    }

    fn long(tag: u16, v: u32) -> Self {
        Self {
            tag,
            field_type: TYPE_LONG,
            count: 1,
            value: v.to_be_bytes().to_vec(),
        }
    }

    /// Bytes this entry occupies in the value area (0 when stored inline).
    fn external_len(&self) -> usize {
        if self.value.len() > 4 {
            self.value.len() + self.value.len() % 2
        } else {
            0
        }
    }
}

/// Size of an IFD including its value area.
fn ifd_len(entries: &[IfdEntry]) -> usize {
    2 + entries.len() * 12 + 4 + entries.iter().map(IfdEntry::external_len).sum::<usize>()
}

/// Append an IFD whose first byte lands at TIFF offset `offset`.
///
/// Values longer than four bytes go into a value area directly after the
/// IFD; shorter ones are stored left-justified in the entry.
fn write_ifd(out: &mut Vec<u8>, entries: &mut [IfdEntry], offset: usize, next_ifd: u32) {
    entries.sort_by_key(|e| e.tag);

    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    let mut value_offset = offset + 2 + entries.len() * 12 + 4;
    for entry in entries.iter() {
        out.extend_from_slice(&entry.tag.to_be_bytes());
        out.extend_from_slice(&entry.field_type.to_be_bytes());
        out.extend_from_slice(&entry.count.to_be_bytes());
        if entry.value.len() > 4 {
            out.extend_from_slice(&(value_offset as u32).to_be_bytes());
            value_offset += entry.external_len();
        } else {
            let mut inline = [0u8; 4];
            inline[..entry.value.len()].copy_from_slice(&entry.value);
            out.extend_from_slice(&inline);
        }
    }
    out.extend_from_slice(&next_ifd.to_be_bytes());

    for entry in entries.iter().filter(|e| e.value.len() > 4) {
        out.extend_from_slice(&entry.value);
        if entry.value.len() % 2 == 1 {
            out.push(0);
        }
    }
}

/// Build the APP1 payload (`Exif\0\0` + TIFF) carrying both date tags.
///
/// `timestamp` is written verbatim; callers pass the canonical
/// `YYYY:MM:DD HH:MM:SS` text.
pub fn build_date_payload(timestamp: &str) -> Vec<u8> {
    let mut exif_ifd = vec![
        IfdEntry::ascii(TAG_DATE_TIME_ORIGINAL, timestamp),
        IfdEntry::ascii(TAG_DATE_TIME_DIGITIZED, timestamp),
    ];

    // IFD0 size does not depend on the pointer value, so lay it out first.
    let ifd0_offset = TIFF_HEADER_LEN;
    let mut ifd0 = vec![IfdEntry::long(TAG_EXIF_IFD_POINTER, 0)];
    let exif_ifd_offset = ifd0_offset + ifd_len(&ifd0);
    ifd0[0] = IfdEntry::long(TAG_EXIF_IFD_POINTER, exif_ifd_offset as u32);

    let mut out = Vec::with_capacity(EXIF_HEADER.len() + exif_ifd_offset + ifd_len(&exif_ifd));
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(b"MM");
    out.extend_from_slice(&42u16.to_be_bytes());
    out.extend_from_slice(&(ifd0_offset as u32).to_be_bytes());
    write_ifd(&mut out, &mut ifd0, ifd0_offset, 0);
    write_ifd(&mut out, &mut exif_ifd, exif_ifd_offset, 0);
    out
}

// ---------------------------------------------------------------------------
// JPEG segment splicing
// ---------------------------------------------------------------------------

fn is_exif_app1(marker: u8, body: &[u8]) -> bool {
    marker == MARKER_APP1 && body.starts_with(EXIF_HEADER)
}

/// Insert `payload` as an APP1 segment into `jpeg`.
///
/// The new segment goes right after SOI, or after a leading JFIF APP0 when
/// one is present. Existing Exif APP1 segments are dropped. Scanning stops
/// at SOS; everything from there on is copied unchanged.
pub fn insert_app1(jpeg: &[u8], payload: &[u8]) -> Result<Vec<u8>, ExifError> {
    if jpeg.len() < 2 || jpeg[0] != 0xFF || jpeg[1] != MARKER_SOI {
        return Err(ExifError::NotJpeg);
    }
    if payload.len() > MAX_SEGMENT_PAYLOAD {
        return Err(ExifError::SegmentTooLarge(payload.len()));
    }

    let mut leading = Vec::new();
    let mut kept = Vec::new();
    let mut seen_other = false;
    let mut pos = 2;

    while pos + 4 <= jpeg.len() && jpeg[pos] == 0xFF {
        let marker = jpeg[pos + 1];
        if marker == MARKER_SOS {
            break;
        }
        // Fill byte before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > jpeg.len() {
            return Err(ExifError::Malformed(pos));
        }
        let segment = &jpeg[pos..pos + 2 + len];
        let body = &segment[4..];

        if is_exif_app1(marker, body) {
            // dropped
        } else if marker == MARKER_APP0 && !seen_other {
            leading.extend_from_slice(segment);
        } else {
            seen_other = true;
            kept.extend_from_slice(segment);
        }
        pos += 2 + len;
    }

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&[0xFF, MARKER_SOI]);
    out.extend_from_slice(&leading);
    out.extend_from_slice(&[0xFF, MARKER_APP1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&kept);
    out.extend_from_slice(&jpeg[pos..]);
    Ok(out)
}
