//! Archive listing implementation.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::Result;
use crate::formats::Entry;
use crate::formats::ZipArchive;

/// Lists archive entries without extracting.
///
/// The whole archive structure is parsed and validated exactly as
/// [`extract`](crate::extract) would, but no files are written.
///
/// # Errors
///
/// Returns `MalformedArchive` if the source is not a valid zip container, or
/// `Io` if reading it fails.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use zipguard_core::list_entries;
/// use zipguard_core::test_utils::ZipBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = ZipBuilder::new()
///     .add_directory("dir/")
///     .add_file("dir/a.txt", b"hello")
///     .build();
///
/// let entries = list_entries(Cursor::new(bytes))?;
/// for entry in &entries {
///     println!("{}: {} bytes", entry.name, entry.uncompressed_size);
/// }
/// assert_eq!(entries.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn list_entries<R: Read + Seek>(source: R) -> Result<Vec<Entry>> {
    let archive = ZipArchive::new(source)?;
    tracing::debug!(entries = archive.len(), "listed archive");
    Ok(archive.into_entries())
}

/// Lists the entries of an archive file on disk.
///
/// # Errors
///
/// Returns `Io` if the file cannot be opened, otherwise as
/// [`list_entries`].
pub fn list_file<P: AsRef<Path>>(archive_path: P) -> Result<Vec<Entry>> {
    let file = File::open(archive_path.as_ref())?;
    list_entries(BufReader::new(file))
}
