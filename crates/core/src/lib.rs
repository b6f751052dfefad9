pub mod access;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod exif;
pub mod hasher;
pub mod organize;
pub mod scanner;

use std::path::{Path, PathBuf};

use tracing::info;

use access::{DestinationDir, SourceDir};
use catalog::Catalog;
use config::{Config, OrganizeOptions};
use domain::*;
use error::Result;

/// Callback events shared by every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A pass is starting. `total` is unknown for the scan walk.
    Start { pass: Pass, total: Option<usize> },
    /// One file (or, for organize, one export target) has been handled.
    Item { path: PathBuf },
    /// The pass ran to the end.
    Complete { pass: Pass },
}

/// The main entry point: one imported source tree and its catalog.
pub struct Library {
    config: Config,
    catalog: Catalog,
    source: SourceDir,
}

impl Library {
    /// Open a source root with the default catalog location, creating the
    /// catalog on first use.
    pub fn open(source_root: &Path) -> Result<Self> {
        Self::open_with_config(Config::for_source(source_root))
    }

    pub fn open_with_config(config: Config) -> Result<Self> {
        let source = config
            .scan_exclusions()
            .iter()
            .fold(SourceDir::open(&config.source_root)?, |dir, path| {
                dir.excluding(path)
            });
        let catalog = Catalog::open(&config.catalog_path)?;
        info!(
            source = %config.source_root.display(),
            catalog = %config.catalog_path.display(),
            "library opened"
        );
        Ok(Self {
            config,
            catalog,
            source,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register every file under the source root.
    pub fn scan(&mut self, progress: Option<&mut dyn FnMut(Progress)>) -> Result<PassReport> {
        let report = scanner::scan_source(&mut self.catalog, &self.source, progress)?;
        self.stamp(Pass::Scan)?;
        Ok(report)
    }

    /// Sniff the MIME type of each record from its leading bytes.
    pub fn detect_mimetypes(
        &mut self,
        force: bool,
        progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<PassReport> {
        let report = enrich::detect_mimetypes(
            &mut self.catalog,
            &self.source,
            self.config.sniff_len,
            force,
            progress,
        )?;
        self.stamp(Pass::Mimetype)?;
        Ok(report)
    }

    /// Hash each record's full content and group identical files.
    pub fn compute_checksums(
        &mut self,
        force: bool,
        progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<PassReport> {
        let report = enrich::compute_checksums(&mut self.catalog, &self.source, force, progress)?;
        self.stamp(Pass::Checksum)?;
        Ok(report)
    }

    /// Resolve creation dates from EXIF or the file path.
    pub fn extract_creation_dates(
        &mut self,
        force: bool,
        progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<PassReport> {
        let report =
            enrich::extract_creation_dates(&mut self.catalog, &self.source, force, progress)?;
        self.stamp(Pass::CreationDate)?;
        Ok(report)
    }

    /// Export one file per checksum group into `dest/YYYY/MM/`.
    pub fn organize(
        &mut self,
        dest: &Path,
        options: OrganizeOptions,
        progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<PassReport> {
        let dest = DestinationDir::open(dest)?;
        let report = organize::organize(&mut self.catalog, &dest, options, progress)?;
        self.stamp(Pass::Organize)?;
        Ok(report)
    }

    /// Scan, then the three enrichment passes in order. Stops at the first
    /// fatal error.
    pub fn run_all(
        &mut self,
        force: bool,
        mut progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<Vec<(Pass, PassReport)>> {
        let mut forward = |event: Progress| {
            if let Some(ref mut cb) = progress {
                cb(event);
            }
        };

        let mut reports = Vec::with_capacity(4);
        reports.push((Pass::Scan, self.scan(Some(&mut forward))?));
        reports.push((
            Pass::Mimetype,
            self.detect_mimetypes(force, Some(&mut forward))?,
        ));
        reports.push((
            Pass::Checksum,
            self.compute_checksums(force, Some(&mut forward))?,
        ));
        reports.push((
            Pass::CreationDate,
            self.extract_creation_dates(force, Some(&mut forward))?,
        ));
        Ok(reports)
    }

    /// All cataloged files in key order.
    pub fn files(&mut self) -> Result<Vec<MediaRecord>> {
        self.catalog.list_files()
    }

    pub fn checksum_groups(&mut self) -> Result<Vec<ChecksumGroup>> {
        self.catalog.list_checksum_groups()
    }

    pub fn status(&mut self) -> Result<CatalogStats> {
        self.catalog.stats()
    }

    /// When `pass` last completed, as an RFC 3339 timestamp.
    pub fn last_run(&mut self, pass: Pass) -> Result<Option<String>> {
        self.catalog.get_config(&last_run_key(pass))
    }

    fn stamp(&mut self, pass: Pass) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.catalog.set_config(&last_run_key(pass), &now)
    }
}

fn last_run_key(pass: Pass) -> String {
    format!("last_{}", pass.as_str().replace('-', "_"))
}
