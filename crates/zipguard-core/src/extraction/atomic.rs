//! Atomic placement of extracted files.
//!
//! Content is written to a temporary file created next to the target, then
//! renamed into place once the caller has verified it. Dropping the
//! temporary file on any error removes it, so a failed entry never leaves a
//! partial file behind.

use std::fs::File;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::ExtractionError;
use crate::Result;

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Writes a file at `target` through a verified temporary file.
///
/// `fill` receives a buffered writer and returns the number of bytes it
/// wrote. When it fails, nothing is placed. With `overwrite` unset the final
/// rename refuses to replace an existing path, so a concurrent writer cannot
/// slip a file in between the caller's existence check and the placement.
///
/// `mode` is applied on Unix and ignored elsewhere.
///
/// # Errors
///
/// Returns `AlreadyExists` if `target` is occupied and `overwrite` is unset,
/// any error returned by `fill`, or `Io` if the temporary file cannot be
/// created, flushed or renamed.
pub fn write_atomic<F>(target: &Path, overwrite: bool, mode: u32, fill: F) -> Result<u64>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<u64>,
{
    let dir = target.parent().ok_or_else(|| {
        ExtractionError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("target has no parent directory: {}", target.display()),
        ))
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(".zipguard-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let bytes = {
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, temp.as_file_mut());
        let bytes = fill(&mut writer)?;
        writer.flush()?;
        bytes
    };

    apply_mode(&temp, mode)?;

    let placed = if overwrite {
        temp.persist(target)
    } else {
        temp.persist_noclobber(target)
    };
    placed.map_err(|e| match e.error.kind() {
        ErrorKind::AlreadyExists => ExtractionError::AlreadyExists {
            path: target.to_path_buf(),
        },
        _ => ExtractionError::Io(e.error),
    })?;

    Ok(bytes)
}

#[cfg(unix)]
fn apply_mode(temp: &NamedTempFile, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    temp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn apply_mode(_temp: &NamedTempFile, _mode: u32) -> Result<()> {
    Ok(())
}
