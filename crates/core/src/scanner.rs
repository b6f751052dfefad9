use tracing::{debug, info, warn};

use crate::access::SourceDir;
use crate::catalog::Catalog;
use crate::domain::{Pass, PassReport};
use crate::error::{Error, Result};
use crate::Progress;

/// Register every regular file under the source root that the catalog has not
/// seen yet. Known paths are left alone and file contents are never read.
/// Paths that are not valid UTF-8 cannot be keyed; they land in
/// `PassReport::failed` and the walk goes on.
pub fn scan_source(
    catalog: &mut Catalog,
    source: &SourceDir,
    mut progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<PassReport> {
    info!(root = %source.root().display(), "scanning source tree");
    if let Some(ref mut cb) = progress {
        cb(Progress::Start {
            pass: Pass::Scan,
            total: None,
        });
    }

    let mut report = PassReport::default();
    source.walk(|path| {
        report.examined += 1;
        if path.to_str().is_none() {
            warn!(path = %path.display(), "path is not valid UTF-8, skipped");
            let reason = Error::NonUtf8Path(path.to_path_buf()).to_string();
            report.failed.push((path.to_path_buf(), reason));
        } else if catalog.has_file(path)? {
            report.skipped += 1;
        } else {
            let key = catalog.add_file(path)?;
            debug!(%key, "registered");
            report.updated += 1;
        }
        if let Some(ref mut cb) = progress {
            cb(Progress::Item {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    })?;

    info!(
        found = report.examined,
        added = report.updated,
        known = report.skipped,
        rejected = report.failed.len(),
        "scan finished"
    );
    if let Some(ref mut cb) = progress {
        cb(Progress::Complete { pass: Pass::Scan });
    }
    Ok(report)
}
