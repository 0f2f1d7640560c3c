//! Compression methods recognized in zip entries.
//!
//! Only stored and deflate are decoded. Every other method is carried through
//! as [`CompressionMethod::Unsupported`] so the entry can fail with its raw
//! identifier instead of being guessed at.

use std::io::Read;
use std::io::Take;

use flate2::read::DeflateDecoder;

/// Compression method of a zip entry.
///
/// # Examples
///
/// ```
/// use zipguard_core::formats::compression::CompressionMethod;
///
/// assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflated);
/// assert_eq!(CompressionMethod::from_u16(14), CompressionMethod::Unsupported(14));
/// assert!(!CompressionMethod::Unsupported(14).is_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Method 0: data is stored verbatim.
    Stored,
    /// Method 8: raw deflate stream.
    Deflated,
    /// Any other method identifier.
    Unsupported(u16),
}

impl CompressionMethod {
    /// Maps a raw method identifier from a zip header.
    #[must_use]
    pub const fn from_u16(method: u16) -> Self {
        match method {
            0 => Self::Stored,
            8 => Self::Deflated,
            other => Self::Unsupported(other),
        }
    }

    /// Returns the raw identifier written in zip headers.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflated => 8,
            Self::Unsupported(other) => other,
        }
    }

    /// Returns `true` if entries with this method can be decoded.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => f.write_str("stored"),
            Self::Deflated => f.write_str("deflate"),
            Self::Unsupported(method) => write!(f, "method {method}"),
        }
    }
}

/// Decoding reader over the compressed bytes of one entry.
///
/// The underlying source is limited to the entry's compressed size, so a
/// decoder can never read into the next entry's data.
pub enum EntryReader<'a, R: Read> {
    /// Stored data passed through as-is.
    Stored(Take<&'a mut R>),
    /// Deflate stream decoded on the fly.
    Deflated(DeflateDecoder<Take<&'a mut R>>),
}

impl<'a, R: Read> EntryReader<'a, R> {
    /// Wraps `source`, positioned at the first byte of entry data.
    ///
    /// Returns `None` for methods that cannot be decoded.
    pub(crate) fn new(
        source: &'a mut R,
        method: CompressionMethod,
        compressed_size: u64,
    ) -> Option<Self> {
        let limited = source.take(compressed_size);
        match method {
            CompressionMethod::Stored => Some(Self::Stored(limited)),
            CompressionMethod::Deflated => Some(Self::Deflated(DeflateDecoder::new(limited))),
            CompressionMethod::Unsupported(_) => None,
        }
    }
}

impl<R: Read> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Stored(inner) => inner.read(buf),
            Self::Deflated(inner) => inner.read(buf),
        }
    }
}
