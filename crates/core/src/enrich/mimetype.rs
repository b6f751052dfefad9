use std::path::Path;

use tracing::{debug, info, warn};

use crate::access::SourceDir;
use crate::catalog::Catalog;
use crate::domain::{Pass, PassReport, MIME_OCTET_STREAM, MIME_UNKNOWN_ERROR};
use crate::error::Result;
use crate::Progress;

/// Classify leading bytes by signature. `None` when nothing matches.
pub fn sniff(head: &[u8]) -> Option<&'static str> {
    infer::get(head).map(|kind| kind.mime_type())
}

/// MIME type for the file at `path`, never failing: unreadable or empty files
/// get [`MIME_UNKNOWN_ERROR`], unrecognised content [`MIME_OCTET_STREAM`].
pub fn classify(source: &SourceDir, path: &Path, sniff_len: usize) -> String {
    match source.read_head(path, sniff_len) {
        Ok(head) if head.is_empty() => {
            warn!(path = %path.display(), "empty file, cannot detect mimetype");
            MIME_UNKNOWN_ERROR.to_string()
        }
        Ok(head) => sniff(&head).unwrap_or(MIME_OCTET_STREAM).to_string(),
        Err(e) => {
            warn!(error = %e, "could not detect mimetype");
            MIME_UNKNOWN_ERROR.to_string()
        }
    }
}

/// Fill in `mime_type` for every record that lacks one (all records if `force`).
pub fn detect_mimetypes(
    catalog: &mut Catalog,
    source: &SourceDir,
    sniff_len: usize,
    force: bool,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<PassReport> {
    let files = catalog.list_files()?;
    info!(total = files.len(), force, "detecting mimetypes");
    if let Some(ref mut cb) = progress {
        cb(Progress::Start {
            pass: Pass::Mimetype,
            total: Some(files.len()),
        });
    }

    let mut report = PassReport::default();
    for mut record in files {
        report.examined += 1;
        if record.mime_type.is_some() && !force {
            report.skipped += 1;
        } else {
            let mime = classify(source, &record.path, sniff_len);
            if mime == MIME_UNKNOWN_ERROR {
                report.unresolved += 1;
            }
            debug!(path = %record.path.display(), %mime, "mimetype");
            record.mime_type = Some(mime);
            catalog.save_media(&record)?;
            report.updated += 1;
        }
        if let Some(ref mut cb) = progress {
            cb(Progress::Item { path: record.path });
        }
    }

    info!(
        updated = report.updated,
        skipped = report.skipped,
        unreadable = report.unresolved,
        "mimetype detection finished"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Complete {
            pass: Pass::Mimetype,
        });
    }
    Ok(report)
}
