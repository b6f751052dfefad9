use std::io::Cursor;

use chrono::NaiveDateTime;
use ::exif::{In, Reader, Tag, Value};

/// Fixed layout of EXIF date/time strings.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Look up an ASCII tag in the primary image of a JPEG/TIFF/PNG/HEIF/WebP buffer.
pub fn read_tag(data: &[u8], tag: Tag) -> Option<String> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => {
            let first = parts.first()?;
            std::str::from_utf8(first).ok().map(|s| s.trim().to_string())
        }
        _ => None,
    }
}

/// Capture time from `DateTimeOriginal`, falling back to `DateTime`.
pub fn read_capture_time(data: &[u8]) -> Option<NaiveDateTime> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(|tag| read_tag(data, tag))
        .find_map(|value| parse_exif_datetime(&value))
}

pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// Minimal JPEG carrying an EXIF block with the given 19-character date in
/// `DateTimeOriginal`.
#[cfg(test)]
pub(crate) fn jpeg_with_date_time_original(date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19);
    let mut tiff: Vec<u8> = Vec::new();
    // Big-endian header, IFD0 at offset 8.
    tiff.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
    // IFD0: one entry, ExifIFDPointer -> 26.
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1a]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    // Exif IFD: one entry, DateTimeOriginal ASCII[20] at offset 44.
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x90, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x2c]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut app1 = b"Exif\x00\x00".to_vec();
    app1.extend_from_slice(&tiff);
    let len = (app1.len() + 2) as u16;

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&len.to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
