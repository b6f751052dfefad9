use std::time::Duration;

use imagescrap_core::domain::{Pass, PassReport};
use imagescrap_core::Progress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn active_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "  {bar:30.cyan/blue} {spinner:.green} {pos:>5}/{len:<5} {prefix:.dim} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━╸─")
}

fn walk_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.green} {pos:>5} files {prefix:.dim} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn done_style() -> ProgressStyle {
    ProgressStyle::with_template("  {bar:30.green} {prefix:.green} {msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn pass_label(pass: Pass) -> &'static str {
    match pass {
        Pass::Scan => "Scanning",
        Pass::Mimetype => "Sniffing",
        Pass::Checksum => "Hashing",
        Pass::CreationDate => "Dating",
        Pass::Organize => "Exporting",
    }
}

/// Renders core progress events as one bar per pass.
#[derive(Default)]
pub struct PassBars {
    mp: MultiProgress,
    active: Option<ProgressBar>,
}

impl PassBars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, progress: Progress) {
        match progress {
            Progress::Start { pass, total } => {
                if let Some(pb) = self.active.take() {
                    pb.finish_and_clear();
                    self.mp.remove(&pb);
                }
                let pb = match total {
                    Some(len) => {
                        let pb = self.mp.add(ProgressBar::new(len as u64));
                        pb.set_style(active_style());
                        pb
                    }
                    None => {
                        let pb = self.mp.add(ProgressBar::new_spinner());
                        pb.set_style(walk_style());
                        pb
                    }
                };
                pb.set_prefix(pass_label(pass));
                pb.enable_steady_tick(Duration::from_millis(80));
                self.active = Some(pb);
            }
            Progress::Item { path } => {
                if let Some(ref pb) = self.active {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    pb.set_message(name);
                    pb.inc(1);
                }
            }
            Progress::Complete { pass } => {
                if let Some(pb) = self.active.take() {
                    let done = pb.position();
                    pb.set_style(done_style());
                    pb.set_prefix("done");
                    pb.finish_with_message(format!("{} {} files", pass, done));
                }
            }
        }
    }

    /// One summary line under the bars.
    pub fn report(&self, pass: Pass, report: &PassReport) {
        self.mp.println(summary_line(pass, report)).ok();
        for (path, reason) in &report.failed {
            self.mp
                .println(format!("    failed: {} ({reason})", path.display()))
                .ok();
        }
    }
}

pub(crate) fn summary_line(pass: Pass, report: &PassReport) -> String {
    let mut line = format!(
        "  {pass}: {} examined, {} updated, {} skipped",
        report.examined, report.updated, report.skipped
    );
    if report.unresolved > 0 {
        line.push_str(&format!(", {} unresolved", report.unresolved));
    }
    if !report.failed.is_empty() {
        line.push_str(&format!(", {} failed", report.failed.len()));
    }
    line
}
