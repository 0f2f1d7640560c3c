//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A validated destination directory for archive extraction.
///
/// This type represents a directory that has been validated to:
/// - Exist on the filesystem
/// - Be a directory (not a file)
/// - Be represented as an absolute canonical path
///
/// Every path produced during extraction is checked against the canonical
/// form held here, so a symlinked destination is resolved exactly once.
///
/// # Examples
///
/// ```no_run
/// use zipguard_core::types::DestDir;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::prepare(PathBuf::from("/tmp/extraction"))?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` for an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path exists but is not a directory
    /// - The path cannot be canonicalized
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("destination directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Creates the directory (with intermediates) if it is missing, then
    /// validates it like [`DestDir::new`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or validated.
    pub fn prepare(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| {
                ExtractionError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create destination {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }
        Self::new(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let path = PathBuf::from("/nonexistent/directory/that/does/not/exist");
        let result = DestDir::new(path);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        let result = DestDir::new(file_path.clone());
        assert!(matches!(result, Err(ExtractionError::Io(_))));

        let result = DestDir::prepare(file_path);
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_prepare_creates_missing_directories() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let nested = temp.path().join("a").join("b").join("c");

        let dest = DestDir::prepare(nested.clone()).expect("should create nested dirs");
        assert!(nested.is_dir());
        assert_eq!(dest.as_path(), nested.canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let path_with_dot = subdir.join(".").join("..");
        let dest = DestDir::new(path_with_dot).expect("should create dest dir");

        assert!(dest.as_path().is_absolute());
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_dest_dir_with_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let symlink_path = temp.path().join("link");
        symlink(&real_dir, &symlink_path).expect("failed to create symlink");

        let dest = DestDir::new(symlink_path).expect("should create from symlink");
        assert_eq!(
            dest.as_path(),
            real_dir.canonicalize().unwrap(),
            "should resolve symlink to real path"
        );
    }

    #[test]
    fn test_dest_dir_into_path_buf() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path().to_path_buf()).expect("should create");
        let path = dest.clone().into_path_buf();
        assert_eq!(path, dest.as_path());
    }
}
