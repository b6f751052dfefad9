use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Key prefix for media records in the catalog.
pub const SOURCE_KEY_PREFIX: &str = "source:";
/// Key prefix for checksum groups in the catalog.
pub const CHECKSUM_KEY_PREFIX: &str = "checksum:";

/// Stored when a file's leading bytes could not be read.
pub const MIME_UNKNOWN_ERROR: &str = "unknown/error";
/// Stored when the leading bytes match no known signature.
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";
/// The one video type the date pass handles (filename fallback only).
pub const MIME_VIDEO: &str = "video/mp4";

/// MIME types the creation-date pass looks at.
pub const DATED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", MIME_VIDEO];

/// A creation date at or before this year is treated as not really set.
pub const RELIABLE_DATE_AFTER_YEAR: i32 = 2000;

/// One cataloged source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: u64,
    pub key: String,
    pub path: PathBuf,
    pub mime_type: Option<String>,
    pub checksum: Option<String>,
    pub creation_date: Option<NaiveDateTime>,
}

impl MediaRecord {
    /// A freshly registered record: only `id`, `key` and `path` are populated.
    pub fn new(id: u64, path: &Path) -> Self {
        Self {
            id,
            key: Self::key_for(path),
            path: path.to_path_buf(),
            mime_type: None,
            checksum: None,
            creation_date: None,
        }
    }

    /// Catalog key for a source path. Pure function of the path for UTF-8
    /// paths, which are the only ones the catalog stores.
    pub fn key_for(path: &Path) -> String {
        format!("{}{}", SOURCE_KEY_PREFIX, path.to_string_lossy())
    }

    /// True when the record carries a creation date newer than the cutoff year.
    pub fn has_reliable_date(&self) -> bool {
        self.creation_date
            .is_some_and(|d| d.year() > RELIABLE_DATE_AFTER_YEAR)
    }
}

/// All source paths sharing one content checksum, in first-hashed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumGroup {
    pub key: String,
    pub sources: Vec<PathBuf>,
}

impl ChecksumGroup {
    pub fn new(checksum: &str, first: &Path) -> Self {
        Self {
            key: Self::key_for(checksum),
            sources: vec![first.to_path_buf()],
        }
    }

    pub fn key_for(checksum: &str) -> String {
        format!("{}{}", CHECKSUM_KEY_PREFIX, checksum)
    }

    /// The bare checksum, without the key prefix.
    pub fn checksum(&self) -> &str {
        self.key
            .strip_prefix(CHECKSUM_KEY_PREFIX)
            .unwrap_or(&self.key)
    }

    /// The canonical path for this content: the first one hashed.
    pub fn representative(&self) -> Option<&Path> {
        self.sources.first().map(PathBuf::as_path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.sources.iter().any(|p| p == path)
    }
}

/// File types the organizer knows how to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Jpeg,
    Png,
    Mp4,
}

impl ExportFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ExportFormat::Jpeg),
            "image/png" => Some(ExportFormat::Png),
            "video/mp4" => Some(ExportFormat::Mp4),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
            ExportFormat::Mp4 => "mp4",
        }
    }
}

/// The independently runnable steps of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Scan,
    Mimetype,
    Checksum,
    CreationDate,
    Organize,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Scan => "scan",
            Pass::Mimetype => "mimetype",
            Pass::Checksum => "checksum",
            Pass::CreationDate => "creation-date",
            Pass::Organize => "organize",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome counts of a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Records (or groups, for organize) looked at.
    pub examined: usize,
    /// Records written back, files registered or files exported.
    pub updated: usize,
    /// Left untouched: already done, or not applicable.
    pub skipped: usize,
    /// Degraded results: sentinel mimetype or no creation date found.
    pub unresolved: usize,
    /// Per-item failures tolerated by the pass.
    pub failed: Vec<(PathBuf, String)>,
}

/// Catalog summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub files: usize,
    pub with_mimetype: usize,
    pub with_checksum: usize,
    pub with_date: usize,
    pub groups: usize,
    /// Group members beyond each group's representative.
    pub duplicates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_key_is_pure_function_of_path() {
        let a = MediaRecord::key_for(Path::new("/photos/a.jpg"));
        let b = MediaRecord::key_for(Path::new("/photos/a.jpg"));
        assert_eq!(a, b);
        assert_eq!(a, "source:/photos/a.jpg");
    }

    #[test]
    fn test_new_record_has_only_path_fields() {
        let r = MediaRecord::new(7, Path::new("/x/y.png"));
        assert_eq!(r.id, 7);
        assert_eq!(r.key, "source:/x/y.png");
        assert!(r.mime_type.is_none());
        assert!(r.checksum.is_none());
        assert!(r.creation_date.is_none());
    }

    #[test]
    fn test_reliable_date_cutoff() {
        let mut r = MediaRecord::new(1, Path::new("a.jpg"));
        assert!(!r.has_reliable_date());

        r.creation_date = NaiveDate::from_ymd_opt(2000, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59));
        assert!(!r.has_reliable_date());

        r.creation_date = NaiveDate::from_ymd_opt(2001, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert!(r.has_reliable_date());
    }

    #[test]
    fn test_group_checksum_and_representative() {
        let mut g = ChecksumGroup::new("abc123", Path::new("a.jpg"));
        g.sources.push(PathBuf::from("b.jpg"));
        assert_eq!(g.key, "checksum:abc123");
        assert_eq!(g.checksum(), "abc123");
        assert_eq!(g.representative(), Some(Path::new("a.jpg")));
        assert!(g.contains(Path::new("b.jpg")));
        assert!(!g.contains(Path::new("c.jpg")));
    }

    #[test]
    fn test_export_format_mapping() {
        assert_eq!(ExportFormat::from_mime("image/jpeg"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_mime("image/png").map(|f| f.extension()), Some("png"));
        assert_eq!(ExportFormat::from_mime("video/mp4").map(|f| f.extension()), Some("mp4"));
        assert_eq!(ExportFormat::from_mime("image/gif"), None);
        assert_eq!(ExportFormat::from_mime(MIME_UNKNOWN_ERROR), None);
    }
}
