use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Leading byte of every stored value. Bump when a record layout changes.
pub const RECORD_VERSION: u8 = 1;

/// Encode a record as `[version][bincode payload]`.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = vec![RECORD_VERSION];
    bincode::serialize_into(&mut buf, value)?;
    Ok(buf)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (&version, payload) = bytes.split_first().ok_or(Error::EmptyRecord)?;
    if version != RECORD_VERSION {
        return Err(Error::UnsupportedRecordVersion(version));
    }
    Ok(bincode::deserialize(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChecksumGroup, MediaRecord};
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};

    fn full_record() -> MediaRecord {
        MediaRecord {
            id: 42,
            key: "source:/photos/IMG_1.jpg".to_string(),
            path: PathBuf::from("/photos/IMG_1.jpg"),
            mime_type: Some("image/jpeg".to_string()),
            checksum: Some("deadbeef".to_string()),
            creation_date: NaiveDate::from_ymd_opt(2019, 7, 4)
                .and_then(|d| d.and_hms_opt(10, 20, 30)),
        }
    }

    #[test]
    fn test_media_record_roundtrip_with_date() {
        let record = full_record();
        let bytes = encode(&record).unwrap();
        assert_eq!(bytes[0], RECORD_VERSION);
        let back: MediaRecord = decode(&bytes).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_media_record_roundtrip_without_date() {
        let mut record = full_record();
        record.creation_date = None;
        let back: MediaRecord = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(back, record);
        assert!(back.creation_date.is_none());
    }

    #[test]
    fn test_fresh_record_roundtrip() {
        let record = MediaRecord::new(0, Path::new("relative/a.png"));
        let back: MediaRecord = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_group_preserves_source_order() {
        let mut group = ChecksumGroup::new("ff00", Path::new("b.jpg"));
        group.sources.push(PathBuf::from("a.jpg"));
        group.sources.push(PathBuf::from("c.jpg"));
        let back: ChecksumGroup = decode(&encode(&group).unwrap()).unwrap();
        assert_eq!(
            back.sources,
            vec![PathBuf::from("b.jpg"), PathBuf::from("a.jpg"), PathBuf::from("c.jpg")]
        );
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut bytes = encode(&full_record()).unwrap();
        bytes[0] = 9;
        let err = decode::<MediaRecord>(&bytes).unwrap_err();
        assert!(matches!(err, Error::UnsupportedRecordVersion(9)));
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode::<MediaRecord>(&[]), Err(Error::EmptyRecord)));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let bytes = encode(&full_record()).unwrap();
        let err = decode::<MediaRecord>(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
