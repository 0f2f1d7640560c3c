//! Validated safe path type for archive extraction.

use crate::ExtractionError;
use crate::PathViolation;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A validated relative path that is safe for extraction.
///
/// `SafePath` represents an entry name that has been validated to not
/// contain:
/// - Path traversal attempts (`..`)
/// - Null bytes
/// - Absolute paths or drive prefixes
/// - Components that resolve through a symlink to outside the destination
///
/// # Security Properties
///
/// - Can ONLY be constructed through validation
/// - NO `From<PathBuf>` implementation
/// - Always resolves within the destination directory
/// - Normalized: no `.` or empty segments
///
/// # Examples
///
/// ```no_run
/// use zipguard_core::types::DestDir;
/// use zipguard_core::types::SafePath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp")?;
///
/// // Valid path
/// let safe = SafePath::validate("foo/bar.txt", &dest)?;
///
/// // Path traversal is rejected
/// assert!(SafePath::validate("../etc/passwd", &dest).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates a zip entry name and constructs a `SafePath`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject null bytes
    /// 2. Treat `\` as a separator
    /// 3. Reject a leading separator or a drive prefix (`C:`)
    /// 4. Reject `..` segments, drop `.` and empty segments
    /// 5. Reject names with no remaining segments
    /// 6. Verify the joined path stays under the destination, both lexically
    ///    and after resolving the nearest existing ancestor
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::UnsafePath` naming the violated rule, or
    /// `ExtractionError::Io` if an existing ancestor cannot be resolved.
    pub fn validate(name: &str, dest: &DestDir) -> Result<Self> {
        let reject = |reason| {
            Err(ExtractionError::UnsafePath {
                path: name.to_string(),
                reason,
            })
        };

        if name.contains('\0') {
            return reject(PathViolation::NullByte);
        }

        let name_slashed = name.replace('\\', "/");
        if name_slashed.starts_with('/') || has_drive_prefix(&name_slashed) {
            return reject(PathViolation::Absolute);
        }

        let mut normalized = PathBuf::new();
        for segment in name_slashed.split('/') {
            match segment {
                "" | "." => {}
                ".." => return reject(PathViolation::ParentTraversal),
                segment => {
                    // A segment must map to exactly one normal component on
                    // this platform, otherwise `push` could replace the path.
                    let mut components = Path::new(segment).components();
                    match (components.next(), components.next()) {
                        (Some(Component::Normal(_)), None) => normalized.push(segment),
                        _ => return reject(PathViolation::Absolute),
                    }
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return reject(PathViolation::Empty);
        }

        let resolved = dest.as_path().join(&normalized);
        if !resolved.starts_with(dest.as_path()) {
            return reject(PathViolation::EscapesRoot);
        }

        if let Some(parent) = resolved.parent()
            && !existing_ancestor_within(parent, dest)?
        {
            return reject(PathViolation::EscapesRoot);
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Checks that the deepest existing ancestor of `path` resolves under `dest`.
fn existing_ancestor_within(path: &Path, dest: &DestDir) -> Result<bool> {
    for ancestor in path.ancestors() {
        if ancestor == dest.as_path() {
            return Ok(true);
        }
        match ancestor.canonicalize() {
            Ok(canonical) => return Ok(canonical.starts_with(dest.as_path())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ExtractionError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to canonicalize {}: {e}", ancestor.display()),
                )));
            }
        }
    }
    Ok(false)
}

fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
