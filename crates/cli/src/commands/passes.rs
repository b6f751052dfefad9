use std::path::Path;

use anyhow::Result;
use imagescrap_core::config::OrganizeOptions;
use imagescrap_core::domain::Pass;
use imagescrap_core::Library;

use super::progress::PassBars;

pub fn scan(library: &mut Library) -> Result<()> {
    let mut bars = PassBars::new();
    let report = library.scan(Some(&mut |p| bars.handle(p)))?;
    bars.report(Pass::Scan, &report);
    Ok(())
}

pub fn mimetype(library: &mut Library, force: bool) -> Result<()> {
    let mut bars = PassBars::new();
    let report = library.detect_mimetypes(force, Some(&mut |p| bars.handle(p)))?;
    bars.report(Pass::Mimetype, &report);
    Ok(())
}

pub fn checksum(library: &mut Library, force: bool) -> Result<()> {
    let mut bars = PassBars::new();
    let report = library.compute_checksums(force, Some(&mut |p| bars.handle(p)))?;
    bars.report(Pass::Checksum, &report);
    Ok(())
}

pub fn dates(library: &mut Library, force: bool) -> Result<()> {
    let mut bars = PassBars::new();
    let report = library.extract_creation_dates(force, Some(&mut |p| bars.handle(p)))?;
    bars.report(Pass::CreationDate, &report);
    Ok(())
}

pub fn run(library: &mut Library, force: bool) -> Result<()> {
    let mut bars = PassBars::new();
    let reports = library.run_all(force, Some(&mut |p| bars.handle(p)))?;
    for (pass, report) in &reports {
        bars.report(*pass, report);
    }
    println!();
    println!("  Import complete.");
    Ok(())
}

pub fn organize(library: &mut Library, dest: &Path, continue_on_error: bool) -> Result<()> {
    let mut bars = PassBars::new();
    let options = OrganizeOptions { continue_on_error };
    let report = library.organize(dest, options, Some(&mut |p| bars.handle(p)))?;
    bars.report(Pass::Organize, &report);
    println!("  Exported to {}", dest.display());
    Ok(())
}
