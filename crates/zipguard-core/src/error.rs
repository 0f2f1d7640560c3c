//! Error types for archive extraction operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Reason an entry path was rejected by containment validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathViolation {
    /// The entry name has no usable components.
    Empty,
    /// The entry name contains a NUL byte.
    NullByte,
    /// The entry name is absolute (leading separator or drive prefix).
    Absolute,
    /// The entry name contains a `..` segment.
    ParentTraversal,
    /// The joined path resolves outside the destination root.
    EscapesRoot,
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Empty => "empty path",
            Self::NullByte => "path contains null bytes",
            Self::Absolute => "absolute path",
            Self::ParentTraversal => "parent directory segment",
            Self::EscapesRoot => "resolves outside destination",
        };
        f.write_str(reason)
    }
}

/// Recorded and observed values that disagreed after decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityMismatch {
    /// Decompressed byte count differs from the recorded uncompressed size.
    Size {
        /// Size recorded in the central directory.
        expected: u64,
        /// Bytes produced by the decompressor (capped at `expected + 1`).
        actual: u64,
    },
    /// CRC-32 of the decompressed content differs from the recorded one.
    Crc {
        /// Checksum recorded in the central directory.
        expected: u32,
        /// Checksum computed over the written bytes.
        actual: u32,
    },
    /// The compressed stream could not be decoded.
    Corrupt {
        /// Bytes decoded before the decoder gave up.
        decoded: u64,
    },
}

impl std::fmt::Display for IntegrityMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Size { expected, actual } => {
                write!(f, "size mismatch (expected {expected} bytes, got {actual})")
            }
            Self::Crc { expected, actual } => {
                write!(
                    f,
                    "crc32 mismatch (expected {expected:#010x}, got {actual:#010x})"
                )
            }
            Self::Corrupt { decoded } => {
                write!(f, "corrupt compressed data after {decoded} bytes")
            }
        }
    }
}

/// Coarse classification of an [`ExtractionError`].
///
/// Reports and callers match on this instead of the full error when only the
/// category matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The byte source is not a valid zip container.
    MalformedArchive,
    /// An entry path would escape the destination root.
    UnsafePath,
    /// The target path is occupied and overwriting is disabled.
    AlreadyExists,
    /// The entry uses a compression method that is not implemented.
    UnsupportedCompression,
    /// The entry is encrypted.
    Encrypted,
    /// Decompressed size or checksum disagrees with the archive.
    IntegrityMismatch,
    /// An underlying filesystem or read operation failed.
    Io,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MalformedArchive => "malformed archive",
            Self::UnsafePath => "unsafe path",
            Self::AlreadyExists => "already exists",
            Self::UnsupportedCompression => "unsupported compression",
            Self::Encrypted => "encrypted",
            Self::IntegrityMismatch => "integrity mismatch",
            Self::Io => "I/O failure",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during archive extraction.
///
/// `MalformedArchive` is raised for the archive as a whole before any entry
/// is processed. Every other variant is recorded against a single entry in
/// the [`ExtractionReport`](crate::ExtractionReport).
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The byte source is not a valid zip container.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// Entry path would escape the destination root.
    #[error("unsafe path {path:?}: {reason}")]
    UnsafePath {
        /// Entry name as recorded in the archive.
        path: String,
        /// Which containment rule rejected it.
        reason: PathViolation,
    },

    /// Target path is already occupied.
    #[error("target already exists: {}", path.display())]
    AlreadyExists {
        /// Filesystem path that is occupied.
        path: PathBuf,
    },

    /// Compression method is not stored or deflate.
    #[error("unsupported compression method {method} for {path:?}")]
    UnsupportedCompression {
        /// Entry name.
        path: String,
        /// Raw method identifier from the archive.
        method: u16,
    },

    /// Entry is flagged as encrypted.
    #[error("encrypted entry not supported: {path:?}")]
    Encrypted {
        /// Entry name.
        path: String,
    },

    /// Decompressed content disagrees with the recorded size or checksum.
    #[error("integrity check failed for {path:?}: {mismatch}")]
    IntegrityMismatch {
        /// Entry name.
        path: String,
        /// Which value disagreed.
        mismatch: IntegrityMismatch,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Returns the coarse category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipguard_core::ExtractionError;
    /// use zipguard_core::FailureKind;
    ///
    /// let err = ExtractionError::MalformedArchive("no end of central directory".into());
    /// assert_eq!(err.kind(), FailureKind::MalformedArchive);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MalformedArchive(_) => FailureKind::MalformedArchive,
            Self::UnsafePath { .. } => FailureKind::UnsafePath,
            Self::AlreadyExists { .. } => FailureKind::AlreadyExists,
            Self::UnsupportedCompression { .. } => FailureKind::UnsupportedCompression,
            Self::Encrypted { .. } => FailureKind::Encrypted,
            Self::IntegrityMismatch { .. } => FailureKind::IntegrityMismatch,
            Self::Io(_) => FailureKind::Io,
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipguard_core::ExtractionError;
    /// use zipguard_core::PathViolation;
    ///
    /// let err = ExtractionError::UnsafePath {
    ///     path: "../etc/passwd".into(),
    ///     reason: PathViolation::ParentTraversal,
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::MalformedArchive("truncated".into());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::UnsafePath { .. })
    }

    /// Returns `true` if this error rejects the archive as a whole.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedArchive(_))
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedArchive(reason.into())
    }
}
