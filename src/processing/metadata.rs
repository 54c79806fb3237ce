//! EXIF carry-over from source to resized output
//!
//! The image encoders write bare pixel data, so the raw EXIF block of the
//! source is read with `kamadak-exif` and spliced back into the encoded
//! output: as an APP1 segment for JPEG and as an `eXIf` chunk for PNG.

use std::io::Cursor;

use image::ImageFormat;
use tracing::debug;

use crate::error::{Result, ShrinkError};

const EXIF_APP1_HEADER: &[u8] = b"Exif\0\0";
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Raw TIFF-structured EXIF block of an encoded image, if it carries one
pub fn read_exif(encoded: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut cursor = Cursor::new(encoded);
    match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => Ok(Some(exif.buf().to_vec())),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(e) => Err(ShrinkError::metadata(format!("Unreadable EXIF block: {}", e))),
    }
}

/// Orientation tag value (1-8) of an encoded image, if present
pub fn orientation(encoded: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(encoded))
        .ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Insert `exif` into `encoded`, an image already encoded as `format`
pub fn embed_exif(format: ImageFormat, encoded: Vec<u8>, exif: &[u8]) -> Result<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => embed_jpeg(encoded, exif),
        ImageFormat::Png => embed_png(encoded, exif),
        other => {
            debug!("EXIF not carried over for {:?} output", other);
            Ok(encoded)
        }
    }
}

fn embed_jpeg(encoded: Vec<u8>, exif: &[u8]) -> Result<Vec<u8>> {
    if encoded.len() < 4 || encoded[..2] != [0xFF, 0xD8] {
        return Err(ShrinkError::metadata("Encoded JPEG has no SOI marker"));
    }

    let segment_len = 2 + EXIF_APP1_HEADER.len() + exif.len();
    let segment_len = u16::try_from(segment_len)
        .map_err(|_| ShrinkError::metadata(format!("EXIF block too large ({} bytes)", exif.len())))?;

    // APP1 goes after a leading JFIF APP0 segment when there is one
    let mut insert_at = 2;
    if encoded[2..4] == [0xFF, 0xE0] && encoded.len() >= 6 {
        let app0_len = usize::from(u16::from_be_bytes([encoded[4], encoded[5]]));
        insert_at = (4 + app0_len).min(encoded.len());
    }

    let mut output = Vec::with_capacity(encoded.len() + usize::from(segment_len) + 2);
    output.extend_from_slice(&encoded[..insert_at]);
    output.extend_from_slice(&[0xFF, 0xE1]);
    output.extend_from_slice(&segment_len.to_be_bytes());
    output.extend_from_slice(EXIF_APP1_HEADER);
    output.extend_from_slice(exif);
    output.extend_from_slice(&encoded[insert_at..]);
    Ok(output)
}

fn embed_png(encoded: Vec<u8>, exif: &[u8]) -> Result<Vec<u8>> {
    if !encoded.starts_with(PNG_SIGNATURE) || encoded.len() < 16 || &encoded[12..16] != b"IHDR" {
        return Err(ShrinkError::metadata("Encoded PNG does not start with IHDR"));
    }

    let ihdr_len = u32::from_be_bytes([encoded[8], encoded[9], encoded[10], encoded[11]]) as usize;
    // length + type + data + crc
    let insert_at = PNG_SIGNATURE.len() + 4 + 4 + ihdr_len + 4;
    if insert_at > encoded.len() {
        return Err(ShrinkError::metadata("Encoded PNG is truncated"));
    }

    let data_len = u32::try_from(exif.len())
        .map_err(|_| ShrinkError::metadata(format!("EXIF block too large ({} bytes)", exif.len())))?;

    let mut chunk = Vec::with_capacity(exif.len() + 12);
    chunk.extend_from_slice(&data_len.to_be_bytes());
    chunk.extend_from_slice(b"eXIf");
    chunk.extend_from_slice(exif);
    let crc = crc32(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    let mut output = Vec::with_capacity(encoded.len() + chunk.len());
    output.extend_from_slice(&encoded[..insert_at]);
    output.extend_from_slice(&chunk);
    output.extend_from_slice(&encoded[insert_at..]);
    Ok(output)
}

/// CRC-32 (ISO 3309) as used by PNG chunks
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
