use std::path::Path;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::access::SourceDir;
use crate::catalog::Catalog;
use crate::domain::{Pass, PassReport, DATED_MIME_TYPES, MIME_VIDEO};
use crate::error::Result;
use crate::exif::read_capture_time;
use crate::Progress;

/// Where a resolved creation date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrigin {
    Exif,
    Filename,
}

fn eight_digits() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]{8}").ok()).as_ref()
}

/// First 8-digit run in `path`, left to right, that is a valid `YYYYMMDD`
/// calendar date. Midnight is used as the time of day.
pub fn date_from_filename(path: &Path) -> Option<NaiveDateTime> {
    let text = path.to_string_lossy();
    eight_digits()?
        .find_iter(&text)
        .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y%m%d").ok())
        .find_map(|d| d.and_hms_opt(0, 0, 0))
}

/// EXIF first (never for video), then the path.
pub fn resolve_creation_date(
    source: &SourceDir,
    path: &Path,
    mime: &str,
) -> Option<(NaiveDateTime, DateOrigin)> {
    if mime != MIME_VIDEO {
        match source.read_all(path) {
            Ok(data) => {
                if let Some(dt) = read_capture_time(&data) {
                    return Some((dt, DateOrigin::Exif));
                }
            }
            Err(e) => debug!(error = %e, "exif read skipped"),
        }
    }
    date_from_filename(path).map(|dt| (dt, DateOrigin::Filename))
}

/// Fill in `creation_date` for JPEG, PNG and MP4 records. A stored date from
/// 2000 or earlier counts as unset.
pub fn extract_creation_dates(
    catalog: &mut Catalog,
    source: &SourceDir,
    force: bool,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<PassReport> {
    let files = catalog.list_files_by_mimetype(&DATED_MIME_TYPES)?;
    info!(total = files.len(), force, "extracting creation dates");
    if let Some(ref mut cb) = progress {
        cb(Progress::Start {
            pass: Pass::CreationDate,
            total: Some(files.len()),
        });
    }

    let mut report = PassReport::default();
    for mut record in files {
        report.examined += 1;
        let mime = record.mime_type.clone().unwrap_or_default();

        if record.has_reliable_date() && !force {
            report.skipped += 1;
        } else {
            match resolve_creation_date(source, &record.path, &mime) {
                Some((date, origin)) => {
                    debug!(path = %record.path.display(), %date, ?origin, "creation date");
                    record.creation_date = Some(date);
                    catalog.save_media(&record)?;
                    report.updated += 1;
                }
                None => {
                    warn!(path = %record.path.display(), "no creation date found");
                    report.unresolved += 1;
                }
            }
        }
        if let Some(ref mut cb) = progress {
            cb(Progress::Item { path: record.path });
        }
    }

    info!(
        dated = report.updated,
        skipped = report.skipped,
        unresolved = report.unresolved,
        "creation date pass finished"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Complete {
            pass: Pass::CreationDate,
        });
    }
    Ok(report)
}
