//! Extraction operation reporting.

use std::time::Duration;

use crate::ExtractionError;
use crate::FailureKind;
use crate::types::EntryType;

/// What happened to a single archive entry.
#[derive(Debug)]
pub enum EntryStatus {
    /// File content was written and verified.
    FileWritten {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// Directory was created.
    DirectoryCreated,
    /// Directory was already present.
    DirectoryExisted,
    /// The entry failed; nothing is left at its target path.
    Failed(ExtractionError),
    /// The entry was not attempted because an earlier failure aborted the
    /// extraction.
    Skipped,
}

impl EntryStatus {
    /// Returns `true` for written files and present directories.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            Self::FileWritten { .. } | Self::DirectoryCreated | Self::DirectoryExisted
        )
    }

    /// Failure category, if the entry failed.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Outcome for one entry, in archive order.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Entry name as recorded in the archive.
    pub name: String,
    /// Regular file or directory.
    pub entry_type: EntryType,
    /// What happened.
    pub status: EntryStatus,
}

/// Report of an archive extraction operation.
///
/// Lists every archive entry with its outcome, plus aggregate counters. When
/// `aborted` is set, entries after the first failure are listed as
/// [`EntryStatus::Skipped`].
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Per-entry outcomes in archive order.
    pub entries: Vec<EntryOutcome>,

    /// Number of files written.
    pub files_written: usize,

    /// Number of directories created or found already present.
    pub directories_created: usize,

    /// Number of entries that failed.
    pub entries_failed: usize,

    /// Number of entries not attempted after an abort.
    pub entries_skipped: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Whether extraction stopped at the first failure.
    pub aborted: bool,

    /// Duration of the extraction operation.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an entry outcome and updates the counters.
    pub fn record(&mut self, name: String, entry_type: EntryType, status: EntryStatus) {
        match &status {
            EntryStatus::FileWritten { bytes } => {
                self.files_written += 1;
                self.bytes_written = self.bytes_written.saturating_add(*bytes);
            }
            EntryStatus::DirectoryCreated | EntryStatus::DirectoryExisted => {
                self.directories_created += 1;
            }
            EntryStatus::Failed(_) => self.entries_failed += 1,
            EntryStatus::Skipped => self.entries_skipped += 1,
        }
        self.entries.push(EntryOutcome {
            name,
            entry_type,
            status,
        });
    }

    /// Number of entries that succeeded.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files_written + self.directories_created
    }

    /// Returns `true` if every entry succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.entries_failed == 0 && self.entries_skipped == 0
    }

    /// Iterates over failed entries and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ExtractionError)> {
        self.entries.iter().filter_map(|outcome| match &outcome.status {
            EntryStatus::Failed(err) => Some((outcome.name.as_str(), err)),
            _ => None,
        })
    }

    /// The failure that aborted the extraction, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<(&str, &ExtractionError)> {
        self.failures().next()
    }
}
