//! Error conversion utilities for CLI.
//!
//! Converts zipguard-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::io::ErrorKind;
use std::path::Path;
use zipguard_core::ExtractionError;
use zipguard_core::ExtractionReport;
use zipguard_core::FailureKind;

/// Guidance shown next to an error of the given kind.
pub fn hint(kind: FailureKind) -> Option<&'static str> {
    match kind {
        FailureKind::MalformedArchive => Some("The archive may be corrupted or truncated."),
        FailureKind::UnsafePath => {
            Some("This archive may be malicious. Do not extract from untrusted sources.")
        }
        FailureKind::AlreadyExists => {
            Some("Remove the existing file or extract into an empty directory.")
        }
        FailureKind::UnsupportedCompression => {
            Some("Only stored and deflate entries are supported. Re-create the archive with deflate.")
        }
        FailureKind::Encrypted => Some("Decrypt the archive with its original tool first."),
        FailureKind::IntegrityMismatch => {
            Some("The entry data is corrupted. Obtain a fresh copy of the archive.")
        }
        FailureKind::Io => None,
    }
}

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    let kind = err.kind();
    let message = match err {
        ExtractionError::Io(io_err) if io_err.kind() == ErrorKind::NotFound => {
            return anyhow!(
                "Archive not found: {} ({io_err})\n\
                 HINT: Run zipguard from the directory that contains '{}'.",
                archive.display(),
                archive.display()
            );
        }
        ExtractionError::Io(io_err) => {
            format!("I/O error while processing '{}': {io_err}", archive.display())
        }
        ExtractionError::MalformedArchive(reason) => {
            format!("Invalid archive '{}': {reason}", archive.display())
        }
        other => format!("Error processing archive '{}': {other}", archive.display()),
    };

    match hint(kind) {
        Some(hint) => anyhow!("{message}\nHINT: {hint}"),
        None => anyhow!(message),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}

/// Summarizes the entry failures recorded in `report`.
pub fn entry_failures(report: &ExtractionReport, archive: &Path) -> anyhow::Error {
    let mut message = format!(
        "{} of {} entries in '{}' failed",
        report.entries_failed,
        report.entries.len(),
        archive.display()
    );
    if report.aborted {
        message.push_str(&format!(
            "; extraction stopped after the first failure ({} skipped)",
            report.entries_skipped
        ));
    }
    anyhow!(message)
}
