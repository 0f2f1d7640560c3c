//! Test utilities for archive creation.
//!
//! [`ZipBuilder`] writes zip archives byte by byte so tests can produce the
//! archives a well-behaved writer never would: traversal names, sizes and
//! checksums that lie, unknown methods, encryption flags.
//!
//! # Panics
//!
//! Functions in this module may panic on I/O errors since they are designed
//! for test use only where panics are acceptable.

#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation
)]

use std::io::Write;

use byteorder::LittleEndian;
use byteorder::WriteBytesExt;
use flate2::Compression;
use flate2::Crc;
use flate2::write::DeflateEncoder;

/// "Version made by": Unix host, APPNOTE version 3.0.
const MADE_BY_UNIX: u16 = 0x031E;
const VERSION_NEEDED: u16 = 20;
const VERSION_ZIP64: u16 = 45;
/// DOS date for 1980-01-01.
const DOS_DATE: u16 = 0x0021;

/// Description of one entry to be written by [`ZipBuilder`].
///
/// Fields left as `None` are computed from `data`.
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// Name written to both headers.
    pub name: String,
    /// Uncompressed content.
    pub data: Vec<u8>,
    /// Raw compression method; 8 deflates `data`, anything else stores it.
    pub method: u16,
    /// General purpose flags.
    pub flags: u16,
    /// "Version made by" field.
    pub version_made_by: u16,
    /// External attributes.
    pub external_attributes: u32,
    /// Recorded CRC-32 override.
    pub crc32: Option<u32>,
    /// Recorded compressed size override.
    pub compressed_size: Option<u64>,
    /// Recorded uncompressed size override.
    pub uncompressed_size: Option<u64>,
    /// Bytes written as entry data instead of the encoded `data`.
    pub payload: Option<Vec<u8>>,
}

impl RawEntry {
    fn file(name: &str, data: &[u8], method: u16) -> Self {
        Self {
            name: name.to_string(),
            data: data.to_vec(),
            method,
            flags: 0,
            version_made_by: MADE_BY_UNIX,
            external_attributes: 0o100_644 << 16,
            crc32: None,
            compressed_size: None,
            uncompressed_size: None,
            payload: None,
        }
    }
}

/// Builder for in-memory zip archives.
///
/// # Examples
///
/// ```
/// use zipguard_core::test_utils::ZipBuilder;
///
/// let zip_data = ZipBuilder::new()
///     .add_directory("dir/")
///     .add_file("dir/a.txt", b"hello")
///     .add_file_with("dir/lies.txt", b"short", |e| e.uncompressed_size = Some(100))
///     .build();
/// assert!(!zip_data.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<RawEntry>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored file.
    #[must_use]
    pub fn add_file(self, name: &str, data: &[u8]) -> Self {
        self.add_file_with(name, data, |_| {})
    }

    /// Adds a deflate-compressed file.
    #[must_use]
    pub fn add_deflated_file(self, name: &str, data: &[u8]) -> Self {
        self.add_file_with(name, data, |e| e.method = 8)
    }

    /// Adds a stored file, letting `customize` tamper with its metadata.
    #[must_use]
    pub fn add_file_with(
        mut self,
        name: &str,
        data: &[u8],
        customize: impl FnOnce(&mut RawEntry),
    ) -> Self {
        let mut raw = RawEntry::file(name, data, 0);
        customize(&mut raw);
        self.entries.push(raw);
        self
    }

    /// Adds a directory entry. The name should end with `/`.
    #[must_use]
    pub fn add_directory(mut self, name: &str) -> Self {
        let mut raw = RawEntry::file(name, b"", 0);
        raw.external_attributes = (0o40_755 << 16) | 0x10;
        self.entries.push(raw);
        self
    }

    /// Sets the archive comment.
    #[must_use]
    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Writes ZIP64 trailer records and saturates the classic ones.
    #[must_use]
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    /// Builds and returns the archive bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for raw in &self.entries {
            let offset = out.len() as u32;
            let payload = match &raw.payload {
                Some(payload) => payload.clone(),
                None if raw.method == 8 => deflate(&raw.data),
                None => raw.data.clone(),
            };
            let crc32 = raw.crc32.unwrap_or_else(|| checksum(&raw.data));
            let compressed = raw.compressed_size.unwrap_or(payload.len() as u64) as u32;
            let uncompressed = raw.uncompressed_size.unwrap_or(raw.data.len() as u64) as u32;
            let name = raw.name.as_bytes();

            out.write_u32::<LittleEndian>(0x0403_4b50).unwrap();
            out.write_u16::<LittleEndian>(VERSION_NEEDED).unwrap();
            out.write_u16::<LittleEndian>(raw.flags).unwrap();
            out.write_u16::<LittleEndian>(raw.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(DOS_DATE).unwrap();
            out.write_u32::<LittleEndian>(crc32).unwrap();
            out.write_u32::<LittleEndian>(compressed).unwrap();
            out.write_u32::<LittleEndian>(uncompressed).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_all(name).unwrap();
            out.write_all(&payload).unwrap();

            central.write_u32::<LittleEndian>(0x0201_4b50).unwrap();
            central
                .write_u16::<LittleEndian>(raw.version_made_by)
                .unwrap();
            central.write_u16::<LittleEndian>(VERSION_NEEDED).unwrap();
            central.write_u16::<LittleEndian>(raw.flags).unwrap();
            central.write_u16::<LittleEndian>(raw.method).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(DOS_DATE).unwrap();
            central.write_u32::<LittleEndian>(crc32).unwrap();
            central.write_u32::<LittleEndian>(compressed).unwrap();
            central.write_u32::<LittleEndian>(uncompressed).unwrap();
            central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central
                .write_u32::<LittleEndian>(raw.external_attributes)
                .unwrap();
            central.write_u32::<LittleEndian>(offset).unwrap();
            central.write_all(name).unwrap();
        }

        let cd_offset = out.len() as u64;
        let cd_size = central.len() as u64;
        let count = self.entries.len() as u64;
        out.write_all(&central).unwrap();

        if self.zip64 {
            let eocd64_offset = out.len() as u64;
            out.write_u32::<LittleEndian>(0x0606_4b50).unwrap();
            out.write_u64::<LittleEndian>(44).unwrap();
            out.write_u16::<LittleEndian>(VERSION_ZIP64).unwrap();
            out.write_u16::<LittleEndian>(VERSION_ZIP64).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(cd_size).unwrap();
            out.write_u64::<LittleEndian>(cd_offset).unwrap();

            out.write_u32::<LittleEndian>(0x0706_4b50).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
            out.write_u32::<LittleEndian>(1).unwrap();
        }

        let (count16, size32, offset32) = if self.zip64 {
            (0xFFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)
        } else {
            (count as u16, cd_size as u32, cd_offset as u32)
        };
        out.write_u32::<LittleEndian>(0x0605_4b50).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(count16).unwrap();
        out.write_u16::<LittleEndian>(count16).unwrap();
        out.write_u32::<LittleEndian>(size32).unwrap();
        out.write_u32::<LittleEndian>(offset32).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16)
            .unwrap();
        out.write_all(&self.comment).unwrap();

        out
    }
}

/// CRC-32 as recorded in zip headers.
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(data);
    crc.sum()
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
