use std::io::BufReader;

use tracing::{debug, info};

use crate::access::SourceDir;
use crate::catalog::Catalog;
use crate::domain::{Pass, PassReport};
use crate::error::{Error, Result};
use crate::hasher::compute_checksum;
use crate::Progress;

/// Hash every record lacking a checksum (all records if `force`) and file the
/// path under its checksum group. The first unreadable file stops the sweep;
/// records hashed before it stay committed.
pub fn compute_checksums(
    catalog: &mut Catalog,
    source: &SourceDir,
    force: bool,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<PassReport> {
    let files = catalog.list_files()?;
    info!(total = files.len(), force, "computing checksums");
    if let Some(ref mut cb) = progress {
        cb(Progress::Start {
            pass: Pass::Checksum,
            total: Some(files.len()),
        });
    }

    let mut report = PassReport::default();
    for mut record in files {
        report.examined += 1;
        if record.checksum.is_some() && !force {
            report.skipped += 1;
        } else {
            let file = source.open_file(&record.path)?;
            let sum = compute_checksum(BufReader::new(file))
                .map_err(|e| Error::unreadable(&record.path, e))?;
            debug!(path = %record.path.display(), checksum = %sum, "hashed");

            let previous = record.checksum.replace(sum);
            catalog.record_checksum(&record, previous.as_deref())?;
            report.updated += 1;
        }
        if let Some(ref mut cb) = progress {
            cb(Progress::Item { path: record.path });
        }
    }

    info!(
        hashed = report.updated,
        skipped = report.skipped,
        "checksum pass finished"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Complete {
            pass: Pass::Checksum,
        });
    }
    Ok(report)
}
