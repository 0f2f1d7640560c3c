//! High-level public API for archive extraction.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::extraction::ExtractionEngine;
use crate::formats::ZipArchive;
use crate::types::DestDir;

/// Extracts a zip archive read from `source` into `output_dir`.
///
/// The archive structure is parsed and validated first; the destination is
/// created (with intermediate directories) only once that succeeds, so a
/// malformed archive never touches the filesystem.
///
/// Per-entry failures do not produce `Err`: they are recorded in the
/// returned [`ExtractionReport`]. Check [`ExtractionReport::is_success`].
///
/// # Errors
///
/// Returns `MalformedArchive` if `source` is not a valid zip container, or
/// `Io` if reading the source or preparing the destination fails.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use zipguard_core::ExtractOptions;
/// use zipguard_core::extract;
/// use zipguard_core::test_utils::ZipBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = ZipBuilder::new()
///     .add_directory("dir/")
///     .add_file("dir/a.txt", b"hello")
///     .build();
/// let output = tempfile::tempdir()?;
///
/// let report = extract(Cursor::new(bytes), output.path(), &ExtractOptions::default())?;
/// assert!(report.is_success());
/// assert_eq!(report.files_written, 1);
/// # Ok(())
/// # }
/// ```
pub fn extract<R: Read + Seek, P: AsRef<Path>>(
    source: R,
    output_dir: P,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let mut archive = ZipArchive::new(source)?;
    let dest = DestDir::prepare(output_dir.as_ref())?;
    Ok(ExtractionEngine::new(&dest, options).run(&mut archive))
}

/// Extracts the zip archive at `archive_path` into `output_dir`.
///
/// # Errors
///
/// Returns `Io` if the archive cannot be opened, otherwise as [`extract`].
///
/// # Examples
///
/// ```no_run
/// use zipguard_core::ExtractOptions;
/// use zipguard_core::extract_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract_file("archive.zip", "/tmp/output", &ExtractOptions::default())?;
/// println!("Extracted {} files", report.files_written);
/// # Ok(())
/// # }
/// ```
pub fn extract_file<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let file = File::open(archive_path.as_ref())?;
    extract(BufReader::new(file), output_dir, options)
}
