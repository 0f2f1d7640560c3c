//! Metadata for a single zip entry.

use crate::formats::compression::CompressionMethod;
use crate::types::EntryType;

/// General purpose flag bit 0: entry data is encrypted.
const FLAG_ENCRYPTED: u16 = 0x0001;

/// MS-DOS directory attribute in the low byte of the external attributes.
const DOS_DIRECTORY_ATTR: u32 = 0x10;

/// Host system identifier for Unix in the "version made by" field.
const HOST_UNIX: u8 = 3;

/// One record from the central directory, with its data offset resolved
/// from the matching local file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name with forward-slash separators, as recorded in the archive.
    pub name: String,
    /// Regular file or directory.
    pub entry_type: EntryType,
    /// Compression method of the entry data.
    pub compression: CompressionMethod,
    /// Size of the entry data as stored in the archive.
    pub compressed_size: u64,
    /// Size of the content after decompression.
    pub uncompressed_size: u64,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
    /// General purpose bit flags.
    pub flags: u16,
    /// Upper byte of "version made by": the host system that wrote the entry.
    pub host_system: u8,
    /// External file attributes.
    pub external_attributes: u32,
    /// Offset of the local file header from the start of the source.
    pub header_offset: u64,
    /// Offset of the first byte of entry data.
    pub data_offset: u64,
}

impl Entry {
    /// Returns `true` if the entry is flagged as encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Returns `true` if this is a directory entry.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        self.entry_type.is_directory()
    }

    /// Unix permission bits, when the entry was written on a Unix host.
    #[must_use]
    pub const fn unix_mode(&self) -> Option<u32> {
        if self.host_system == HOST_UNIX {
            let mode = self.external_attributes >> 16;
            if mode != 0 {
                return Some(mode);
            }
        }
        None
    }
}

/// Infers the entry type from its name and attributes.
///
/// A trailing separator marks a directory. The DOS directory attribute only
/// counts for entries without content, so data is never dropped silently.
pub(crate) fn infer_entry_type(
    name: &str,
    external_attributes: u32,
    uncompressed_size: u64,
) -> EntryType {
    let dos_directory = external_attributes & DOS_DIRECTORY_ATTR != 0 && uncompressed_size == 0;
    if name.ends_with('/') || name.ends_with('\\') || dos_directory {
        EntryType::Directory
    } else {
        EntryType::File
    }
}
