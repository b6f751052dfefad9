use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::access::DestinationDir;
use crate::catalog::Catalog;
use crate::config::OrganizeOptions;
use crate::domain::{ChecksumGroup, ExportFormat, Pass, PassReport};
use crate::error::{Error, Result};
use crate::Progress;

/// (year, month, day) used for file naming. Undated records fall back to
/// 0001-01-01.
pub fn date_parts(date: Option<NaiveDateTime>) -> (i32, u32, u32) {
    date.map(|d| (d.year(), d.month(), d.day()))
        .unwrap_or((1, 1, 1))
}

/// Build the target directory: dest/YYYY/MM
pub fn target_dir(dest: &Path, date: (i32, u32, u32)) -> PathBuf {
    let (year, month, _) = date;
    dest.join(format!("{:04}", year))
        .join(format!("{:02}", month))
}

/// `image_<YYYYMMDD>_<index>.<ext>`
pub fn target_file_name(date: (i32, u32, u32), index: usize, format: ExportFormat) -> String {
    let (year, month, day) = date;
    format!(
        "image_{:04}{:02}{:02}_{}.{}",
        year,
        month,
        day,
        index,
        format.extension()
    )
}

/// Copy one representative per checksum group into `dest/YYYY/MM/`.
///
/// Groups are visited in key order and numbered from 0; the number is part of
/// the file name, so re-running overwrites the same targets. Representatives
/// whose type is not JPEG, PNG or MP4 are skipped. A failed copy aborts unless
/// `options.continue_on_error` is set, in which case it lands in
/// `PassReport::failed`.
pub fn organize(
    catalog: &mut Catalog,
    dest: &DestinationDir,
    options: OrganizeOptions,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<PassReport> {
    let groups = catalog.list_checksum_groups()?;
    info!(
        groups = groups.len(),
        dest = %dest.root().display(),
        "organizing"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Start {
            pass: Pass::Organize,
            total: Some(groups.len()),
        });
    }

    let mut report = PassReport::default();
    for (index, group) in groups.iter().enumerate() {
        report.examined += 1;
        let item = export_group(catalog, dest, options, index, group, &mut report)?;
        if let Some(ref mut cb) = progress {
            cb(Progress::Item { path: item });
        }
    }

    info!(
        exported = report.updated,
        skipped = report.skipped,
        failed = report.failed.len(),
        "organize finished"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Complete {
            pass: Pass::Organize,
        });
    }
    Ok(report)
}

/// Export one group, updating `report`. Returns the path to show as progress:
/// the copy target, or the skipped source.
fn export_group(
    catalog: &mut Catalog,
    dest: &DestinationDir,
    options: OrganizeOptions,
    index: usize,
    group: &ChecksumGroup,
    report: &mut PassReport,
) -> Result<PathBuf> {
    let Some(source) = group.representative() else {
        report.skipped += 1;
        return Ok(PathBuf::from(&group.key));
    };
    let record = catalog
        .get_file(source)?
        .ok_or_else(|| Error::MissingRecord(source.to_path_buf()))?;

    let format = record.mime_type.as_deref().and_then(ExportFormat::from_mime);
    let Some(format) = format else {
        debug!(
            path = %source.display(),
            mime = record.mime_type.as_deref().unwrap_or("-"),
            "not exportable, skipped"
        );
        report.skipped += 1;
        return Ok(source.to_path_buf());
    };

    let date = date_parts(record.creation_date);
    if record.creation_date.is_none() {
        warn!(path = %source.display(), "exporting without a creation date");
    }
    let dir = target_dir(dest.root(), date);
    let target = dir.join(target_file_name(date, index, format));

    let copied = dest
        .ensure_dir(&dir)
        .and_then(|()| dest.copy_file(source, &target));
    match copied {
        Ok(bytes) => {
            debug!(from = %source.display(), to = %target.display(), bytes, "exported");
            report.updated += 1;
        }
        Err(e) if options.continue_on_error => {
            warn!(path = %source.display(), error = %e, "export failed, continuing");
            report.failed.push((source.to_path_buf(), e.to_string()));
        }
        Err(e) => return Err(e),
    }
    Ok(target)
}
