use std::path::{Path, PathBuf};

/// Directory under the source root that holds the catalog.
pub const CATALOG_DIR: &str = ".imagescrap";
/// Catalog file name inside [`CATALOG_DIR`].
pub const CATALOG_FILE: &str = "catalog.db";
/// Files SQLite keeps beside the catalog, as suffixes of its name.
const CATALOG_SIDECARS: [&str; 3] = ["-wal", "-shm", "-journal"];
/// How many leading bytes the mimetype pass reads.
pub const DEFAULT_SNIFF_LEN: usize = 512;

/// Settings for one opened source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_root: PathBuf,
    pub catalog_path: PathBuf,
    pub sniff_len: usize,
}

impl Config {
    /// Defaults: catalog at `<source_root>/.imagescrap/catalog.db`.
    pub fn for_source(source_root: &Path) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            catalog_path: source_root.join(CATALOG_DIR).join(CATALOG_FILE),
            sniff_len: DEFAULT_SNIFF_LEN,
        }
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_sniff_len(mut self, len: usize) -> Self {
        self.sniff_len = len;
        self
    }

    /// The default catalog directory, which scans never descend into.
    pub fn catalog_dir(&self) -> PathBuf {
        self.source_root.join(CATALOG_DIR)
    }

    /// Paths a scan must not register: the default catalog directory, the
    /// configured catalog file and the SQLite sidecars next to it.
    pub fn scan_exclusions(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.catalog_dir(), self.catalog_path.clone()];
        for suffix in CATALOG_SIDECARS {
            let mut name = self.catalog_path.clone().into_os_string();
            name.push(suffix);
            paths.push(PathBuf::from(name));
        }
        paths
    }
}

/// Behaviour of the organize step on a failed copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Record the failure and move on instead of aborting the run.
    pub continue_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_under_source_root() {
        let config = Config::for_source(Path::new("/photos"));
        assert_eq!(config.catalog_path, PathBuf::from("/photos/.imagescrap/catalog.db"));
        assert_eq!(config.catalog_dir(), PathBuf::from("/photos/.imagescrap"));
        assert_eq!(config.sniff_len, 512);
    }

    #[test]
    fn test_overrides() {
        let config = Config::for_source(Path::new("/photos"))
            .with_catalog_path("/elsewhere/c.db")
            .with_sniff_len(64);
        assert_eq!(config.catalog_path, PathBuf::from("/elsewhere/c.db"));
        assert_eq!(config.sniff_len, 64);
    }

    #[test]
    fn test_scan_exclusions_cover_custom_catalog_and_sidecars() {
        let config = Config::for_source(Path::new("/photos")).with_catalog_path("/photos/db/c.db");
        assert_eq!(
            config.scan_exclusions(),
            vec![
                PathBuf::from("/photos/.imagescrap"),
                PathBuf::from("/photos/db/c.db"),
                PathBuf::from("/photos/db/c.db-wal"),
                PathBuf::from("/photos/db/c.db-shm"),
                PathBuf::from("/photos/db/c.db-journal"),
            ]
        );
    }

    #[test]
    fn test_organize_defaults_to_abort() {
        assert!(!OrganizeOptions::default().continue_on_error);
    }
}
