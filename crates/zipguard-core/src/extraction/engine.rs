//! Core extraction engine.

use std::fs;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::time::Instant;

use crate::EntryStatus;
use crate::ExtractOptions;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::PathViolation;
use crate::Result;
use crate::extraction::atomic::write_atomic;
use crate::extraction::stream::copy_validated;
use crate::formats::Entry;
use crate::formats::ZipArchive;
use crate::security::effective_mode;
use crate::types::DestDir;
use crate::types::EntryType;
use crate::types::SafePath;

/// Materializes the entries of a parsed archive under a destination root.
///
/// Entries are processed sequentially in archive order. Every entry ends up
/// in the report: written, failed, or skipped after an abort.
#[derive(Debug)]
pub struct ExtractionEngine<'a> {
    dest: &'a DestDir,
    options: &'a ExtractOptions,
}

impl<'a> ExtractionEngine<'a> {
    /// Creates an engine writing under `dest`.
    #[must_use]
    pub const fn new(dest: &'a DestDir, options: &'a ExtractOptions) -> Self {
        Self { dest, options }
    }

    /// Extracts every entry of `archive`.
    ///
    /// Entry failures never escape as `Err`; they are recorded in the
    /// report. Unless `continue_on_error` is set, the first failure marks
    /// the report aborted and the remaining entries are recorded as skipped.
    pub fn run<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> ExtractionReport {
        let start = Instant::now();
        let mut report = ExtractionReport::new();
        tracing::info!(
            dest = %self.dest.as_path().display(),
            entries = archive.len(),
            "starting extraction"
        );

        for index in 0..archive.len() {
            let entry = archive.entries()[index].clone();
            if report.aborted {
                report.record(entry.name, entry.entry_type, EntryStatus::Skipped);
                continue;
            }

            let status = match self.extract_entry(archive, index, &entry) {
                Ok(status) => {
                    tracing::debug!(entry = %entry.name, status = ?status, "extracted entry");
                    status
                }
                Err(err) => {
                    tracing::warn!(entry = %entry.name, error = %err, "entry failed");
                    if !self.options.continue_on_error {
                        report.aborted = true;
                    }
                    EntryStatus::Failed(err)
                }
            };
            report.record(entry.name, entry.entry_type, status);
        }

        report.duration = start.elapsed();
        tracing::info!(
            files = report.files_written,
            directories = report.directories_created,
            failed = report.entries_failed,
            skipped = report.entries_skipped,
            bytes = report.bytes_written,
            aborted = report.aborted,
            "extraction finished"
        );
        report
    }

    fn extract_entry<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
        entry: &Entry,
    ) -> Result<EntryStatus> {
        let safe_path = match SafePath::validate(&entry.name, self.dest) {
            // `./` and `.` name the destination root, which already exists
            Err(ExtractionError::UnsafePath {
                reason: PathViolation::Empty,
                ..
            }) if entry.is_dir() => return Ok(EntryStatus::DirectoryExisted),
            validated => validated?,
        };
        let target = self.dest.join(&safe_path);

        match entry.entry_type {
            EntryType::Directory => create_directory(&target),
            EntryType::File => self.extract_file(archive, index, entry, &target),
        }
    }

    fn extract_file<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        index: usize,
        entry: &Entry,
        target: &Path,
    ) -> Result<EntryStatus> {
        if let Some(parent) = target.parent() {
            ensure_parent(parent, self.options.create_missing_directories)?;
        }

        // Early check so an occupied target is reported without decoding.
        // The no-clobber rename in write_atomic is what actually guarantees it.
        match fs::symlink_metadata(target) {
            Ok(meta) if meta.is_dir() || !self.options.overwrite_existing => {
                return Err(ExtractionError::AlreadyExists {
                    path: target.to_path_buf(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let reader = archive.reader(index)?;
        let mode = effective_mode(entry.unix_mode(), self.options.preserve_permissions);
        let bytes = write_atomic(target, self.options.overwrite_existing, mode, |writer| {
            copy_validated(
                reader,
                writer,
                &entry.name,
                entry.uncompressed_size,
                entry.crc32,
            )
        })?;

        Ok(EntryStatus::FileWritten { bytes })
    }
}

fn ensure_parent(parent: &Path, create_missing: bool) -> Result<()> {
    if parent.is_dir() {
        return Ok(());
    }
    if create_missing {
        fs::create_dir_all(parent)?;
        return Ok(());
    }
    Err(ExtractionError::Io(std::io::Error::new(
        ErrorKind::NotFound,
        format!("parent directory does not exist: {}", parent.display()),
    )))
}

/// Creates a directory entry. Existing directories are accepted as-is.
fn create_directory(target: &Path) -> Result<EntryStatus> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(EntryStatus::DirectoryExisted),
        Ok(_) => Err(ExtractionError::AlreadyExists {
            path: target.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(target)?;
            Ok(EntryStatus::DirectoryCreated)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::FailureKind;
    use crate::test_utils::ZipBuilder;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(bytes: Vec<u8>, dest: &Path, options: &ExtractOptions) -> ExtractionReport {
        let dest = DestDir::new(dest.to_path_buf()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        ExtractionEngine::new(&dest, options).run(&mut archive)
    }

    #[test]
    fn test_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new()
            .add_directory("dir/")
            .add_file("dir/a.txt", b"hello")
            .build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert!(report.is_success());
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.bytes_written, 5);
        assert!(matches!(
            report.entries[0].status,
            EntryStatus::DirectoryCreated
        ));
        assert_eq!(
            std::fs::read(temp.path().join("dir/a.txt")).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_existing_directory_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("dir")).unwrap();
        let bytes = ZipBuilder::new().add_directory("dir/").build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert!(matches!(
            report.entries[0].status,
            EntryStatus::DirectoryExisted
        ));
    }

    #[test]
    fn test_current_directory_entry_is_root() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new()
            .add_directory("./")
            .add_file("a.txt", b"hello")
            .build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert!(report.is_success());
        assert!(matches!(
            report.entries[0].status,
            EntryStatus::DirectoryExisted
        ));
        assert_eq!(std::fs::read(temp.path().join("a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_directory_entry_over_file_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("dir"), b"file").unwrap();
        let bytes = ZipBuilder::new().add_directory("dir/").build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert_eq!(
            report.entries[0].status.failure_kind(),
            Some(FailureKind::AlreadyExists)
        );
    }

    #[test]
    fn test_file_over_directory_fails_even_with_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("a.txt")).unwrap();
        let bytes = ZipBuilder::new().add_file("a.txt", b"hello").build();

        let options = ExtractOptions::default().with_overwrite_existing(true);
        let report = run(bytes, temp.path(), &options);

        assert_eq!(
            report.entries[0].status.failure_kind(),
            Some(FailureKind::AlreadyExists)
        );
        assert!(temp.path().join("a.txt").is_dir());
    }

    #[test]
    fn test_first_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new()
            .add_file("../evil.txt", b"evil")
            .add_file("good.txt", b"good")
            .build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert!(report.aborted);
        assert_eq!(report.entries_failed, 1);
        assert_eq!(report.entries_skipped, 1);
        assert!(matches!(report.entries[1].status, EntryStatus::Skipped));
        assert!(!temp.path().join("good.txt").exists());
    }

    #[test]
    fn test_continue_on_error_processes_all() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new()
            .add_file("../evil.txt", b"evil")
            .add_file_with("bad.txt", b"data", |e| e.method = 12)
            .add_file("good.txt", b"good")
            .build();

        let options = ExtractOptions::default().with_continue_on_error(true);
        let report = run(bytes, temp.path(), &options);

        assert!(!report.aborted);
        assert_eq!(report.entries_failed, 2);
        assert_eq!(report.files_written, 1);
        assert_eq!(
            report.entries[1].status.failure_kind(),
            Some(FailureKind::UnsupportedCompression)
        );
        assert!(temp.path().join("good.txt").exists());
        assert!(!temp.path().join("bad.txt").exists());
    }

    #[test]
    fn test_missing_parent_without_create() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new().add_file("sub/a.txt", b"hello").build();

        let options = ExtractOptions::default().with_create_missing_directories(false);
        let report = run(bytes, temp.path(), &options);

        assert_eq!(
            report.entries[0].status.failure_kind(),
            Some(FailureKind::Io)
        );
        assert!(!temp.path().join("sub").exists());
    }

    #[test]
    fn test_encrypted_entry_fails() {
        let temp = TempDir::new().unwrap();
        let bytes = ZipBuilder::new()
            .add_file_with("secret.txt", b"data", |e| e.flags = 0x0001)
            .build();

        let report = run(bytes, temp.path(), &ExtractOptions::default());

        assert_eq!(
            report.entries[0].status.failure_kind(),
            Some(FailureKind::Encrypted)
        );
        assert!(!temp.path().join("secret.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_default_and_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let build = || {
            ZipBuilder::new()
                .add_file_with("run.sh", b"#!/bin/sh\n", |e| {
                    e.external_attributes = 0o104_777 << 16;
                })
                .build()
        };
        let mode_of = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o7777;

        let temp = TempDir::new().unwrap();
        run(build(), temp.path(), &ExtractOptions::default());
        assert_eq!(mode_of(&temp.path().join("run.sh")), 0o644);

        let temp = TempDir::new().unwrap();
        let options = ExtractOptions::default().with_preserve_permissions(true);
        run(build(), temp.path(), &options);
        assert_eq!(mode_of(&temp.path().join("run.sh")), 0o755);
    }
}
