//! Capturing a list of URLs from the command line.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use pagesnap_engine::{Archiver, CaptureError, StageSink, StoredEntry};
use pagesnap_logging::snap_info;

const RULE_WIDTH: usize = 60;

/// URLs from a list file: one per line, blank lines and `#` comments skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Outcome of one capture within a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub url: String,
    pub outcome: Result<StoredEntry, CaptureError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Percentage of successful captures; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.succeeded() as f64 * 100.0 / self.items.len() as f64
    }

    /// A batch counts as failed only when nothing was captured.
    pub fn any_succeeded(&self) -> bool {
        self.succeeded() > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "succeeded: {}\nfailed: {}\nsuccess rate: {:.1}%\n",
            self.succeeded(),
            self.failed(),
            self.success_rate()
        )
    }

    /// Per-URL results followed by the summary, as written by `--output`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, item) in self.items.iter().enumerate() {
            let _ = writeln!(out, "# URL {}: {}", index + 1, item.url);
            match &item.outcome {
                Ok(stored) => {
                    let _ = writeln!(out, "ok: {}", stored.paths.simple.display());
                }
                Err(err) => {
                    let _ = writeln!(out, "failed: {err}");
                }
            }
            out.push('\n');
        }
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&self.summary());
        out
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

/// Captures `urls` one after another. A failed URL is recorded and the batch
/// moves on; nothing is retried.
pub async fn capture_all(archiver: &Archiver, urls: &[String], sink: &dyn StageSink) -> BatchReport {
    let mut report = BatchReport::default();
    for (index, url) in urls.iter().enumerate() {
        snap_info!("batch capture {}/{}: {}", index + 1, urls.len(), url);
        let outcome = archiver.capture(url, sink).await;
        report.items.push(BatchItem {
            url: url.clone(),
            outcome,
        });
    }
    report
}
