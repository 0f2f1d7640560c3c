//! Human-readable output with colors and styling.

use console::Term;
use console::style;
use zipguard_core::ExtractionReport;

use crate::error::hint;

pub struct HumanOutput {
    use_colors: bool,
    out: Term,
    err: Term,
}

impl HumanOutput {
    pub fn new() -> Self {
        Self {
            use_colors: console::colors_enabled(),
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    /// Prints the headline and a one-line summary to stdout.
    pub fn extraction_result(&self, report: &ExtractionReport) {
        let headline = if report.is_success() {
            "Extraction completed"
        } else {
            "Extraction failed"
        };
        let line = match (self.use_colors, report.is_success()) {
            (true, true) => format!("{} {headline}", style("✓").green().bold()),
            (true, false) => format!("{} {headline}", style("✗").red().bold()),
            (false, _) => headline.to_string(),
        };
        let _ = self.out.write_line(&line);

        let _ = self.out.write_line(&format!(
            "  {} files, {} directories, {} written, {} failed, {} skipped in {:.2?}",
            report.files_written,
            report.directories_created,
            Self::format_size(report.bytes_written),
            report.entries_failed,
            report.entries_skipped,
            report.duration
        ));
    }

    /// Lists failed entries on stderr.
    pub fn failures(&self, report: &ExtractionReport) {
        for (name, err) in report.failures() {
            let label = if self.use_colors {
                style("FAILED:").red().bold().to_string()
            } else {
                "FAILED:".to_string()
            };
            let _ = self.err.write_line(&format!("{label} {name}: {err}"));
            if let Some(hint) = hint(err.kind()) {
                let _ = self.err.write_line(&format!("  HINT: {hint}"));
            }
        }
    }
}
