//! ZIP container reader.
//!
//! Opening a [`ZipArchive`] parses the end of central directory record, the
//! central directory, and every local file header. Any structural problem is
//! reported as [`ExtractionError::MalformedArchive`] at this point, before a
//! caller has touched the filesystem. Entry data is only read later, one
//! entry at a time, through [`ZipArchive::reader`].

use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

use crate::ExtractionError;
use crate::Result;
use crate::formats::compression::CompressionMethod;
use crate::formats::compression::EntryReader;
use crate::formats::entry::Entry;
use crate::formats::entry::infer_entry_type;
use crate::formats::name::decode_name;
use crate::formats::records::CentralHeader;
use crate::formats::records::EOCD_SIGNATURE;
use crate::formats::records::EndOfCentralDirectory;
use crate::formats::records::LocalHeader;
use crate::formats::records::Zip64EndOfCentralDirectory;
use crate::formats::records::Zip64Locator;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
const MAX_COMMENT_SIZE: u64 = 65535;

/// Location of the central directory after resolving ZIP64 indirection.
struct CentralDirectory {
    offset: u64,
    size: u64,
    total_entries: u64,
    /// First byte after the central directory that belongs to trailer records.
    end: u64,
}

/// A parsed zip archive over a seekable source.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use zipguard_core::formats::ZipArchive;
/// use zipguard_core::test_utils::ZipBuilder;
///
/// let bytes = ZipBuilder::new().add_file("a.txt", b"hello").build();
/// let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
/// assert_eq!(archive.len(), 1);
/// assert_eq!(archive.entries()[0].name, "a.txt");
/// ```
#[derive(Debug)]
pub struct ZipArchive<R> {
    source: R,
    entries: Vec<Entry>,
}

impl<R: Read + Seek> ZipArchive<R> {
    /// Parses the archive structure.
    ///
    /// # Errors
    ///
    /// Returns `MalformedArchive` if the source is empty, has no end of
    /// central directory record, spans multiple volumes, or has headers that
    /// are truncated, carry bad signatures, or point outside the source.
    /// Returns `Io` if the source itself fails to read or seek.
    pub fn new(mut source: R) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        if len == 0 {
            return Err(ExtractionError::malformed("archive is empty"));
        }

        let (eocd, eocd_offset) = find_eocd(&mut source, len)?;
        let directory = locate_central_directory(&mut source, &eocd, eocd_offset)?;

        let cd_end = directory
            .offset
            .checked_add(directory.size)
            .filter(|end| *end <= directory.end)
            .ok_or_else(|| {
                ExtractionError::malformed("central directory extends past its trailer")
            })?;
        tracing::trace!(
            offset = directory.offset,
            size = directory.size,
            end = cd_end,
            entries = directory.total_entries,
            "located central directory"
        );

        let cd_size = usize::try_from(directory.size)
            .map_err(|_| ExtractionError::malformed("central directory too large"))?;
        let mut cd_data = vec![0u8; cd_size];
        source.seek(SeekFrom::Start(directory.offset))?;
        read_fully(&mut source, &mut cd_data, "central directory")?;

        // A lying entry count must not drive the allocation
        let capacity = usize::try_from(directory.total_entries)
            .unwrap_or(usize::MAX)
            .min(cd_size / CentralHeader::FIXED_SIZE);
        let mut entries = Vec::with_capacity(capacity);
        let mut cursor = Cursor::new(cd_data.as_slice());
        for _ in 0..directory.total_entries {
            let header = CentralHeader::parse(&mut cursor)?;
            entries.push(resolve_entry(&mut source, header, directory.offset)?);
        }

        Ok(Self { source, entries })
    }

    /// Returns a decoding reader positioned at the data of entry `index`.
    ///
    /// # Errors
    ///
    /// Returns `Encrypted` or `UnsupportedCompression` for entries that
    /// cannot be decoded, and `Io` if seeking fails.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn reader(&mut self, index: usize) -> Result<EntryReader<'_, R>> {
        let entry = &self.entries[index];
        if entry.is_encrypted() {
            return Err(ExtractionError::Encrypted {
                path: entry.name.clone(),
            });
        }
        let unsupported = || ExtractionError::UnsupportedCompression {
            path: entry.name.clone(),
            method: entry.compression.to_u16(),
        };
        if !entry.compression.is_supported() {
            return Err(unsupported());
        }

        self.source.seek(SeekFrom::Start(entry.data_offset))?;
        EntryReader::new(&mut self.source, entry.compression, entry.compressed_size)
            .ok_or_else(unsupported)
    }
}

impl<R> ZipArchive<R> {
    /// Entries in central directory order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the archive, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

/// Finds the end of central directory record, searching backwards past an
/// archive comment if needed.
fn find_eocd<R: Read + Seek>(source: &mut R, len: u64) -> Result<(EndOfCentralDirectory, u64)> {
    let eocd_size = EndOfCentralDirectory::SIZE as u64;
    if len < eocd_size {
        return Err(ExtractionError::malformed(
            "too short to contain an end of central directory record",
        ));
    }

    let search_size = (MAX_COMMENT_SIZE + eocd_size).min(len);
    let search_start = len - search_size;
    let mut buf = vec![0u8; usize::try_from(search_size).unwrap_or(0)];
    source.seek(SeekFrom::Start(search_start))?;
    read_fully(source, &mut buf, "archive trailer")?;

    let signature = EOCD_SIGNATURE.to_le_bytes();
    for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
        if buf[i..i + 4] != signature {
            continue;
        }
        let eocd = EndOfCentralDirectory::parse(&buf[i..i + EndOfCentralDirectory::SIZE])?;
        // The comment must fit in what follows the record
        if i + EndOfCentralDirectory::SIZE + usize::from(eocd.comment_len) <= buf.len() {
            return Ok((eocd, search_start + i as u64));
        }
    }

    Err(ExtractionError::malformed(
        "end of central directory record not found",
    ))
}

fn locate_central_directory<R: Read + Seek>(
    source: &mut R,
    eocd: &EndOfCentralDirectory,
    eocd_offset: u64,
) -> Result<CentralDirectory> {
    if !eocd.needs_zip64() {
        if eocd.disk_number != 0 || eocd.cd_disk != 0 || eocd.entries_on_disk != eocd.total_entries
        {
            return Err(ExtractionError::malformed(
                "multi-volume archives are not supported",
            ));
        }
        return Ok(CentralDirectory {
            offset: u64::from(eocd.cd_offset),
            size: u64::from(eocd.cd_size),
            total_entries: u64::from(eocd.total_entries),
            end: eocd_offset,
        });
    }

    let locator_offset = eocd_offset
        .checked_sub(Zip64Locator::SIZE as u64)
        .ok_or_else(|| ExtractionError::malformed("missing zip64 locator"))?;
    let mut locator_buf = [0u8; Zip64Locator::SIZE];
    source.seek(SeekFrom::Start(locator_offset))?;
    read_fully(source, &mut locator_buf, "zip64 locator")?;
    let locator = Zip64Locator::parse(&locator_buf)?;
    if locator.eocd64_disk != 0 || locator.total_disks > 1 {
        return Err(ExtractionError::malformed(
            "multi-volume archives are not supported",
        ));
    }
    if locator.eocd64_offset >= locator_offset {
        return Err(ExtractionError::malformed(
            "zip64 end of central directory out of bounds",
        ));
    }

    let mut eocd64_buf = [0u8; Zip64EndOfCentralDirectory::MIN_SIZE];
    source.seek(SeekFrom::Start(locator.eocd64_offset))?;
    read_fully(source, &mut eocd64_buf, "zip64 end of central directory")?;
    let eocd64 = Zip64EndOfCentralDirectory::parse(&eocd64_buf)?;
    if eocd64.disk_number != 0 || eocd64.cd_disk != 0 {
        return Err(ExtractionError::malformed(
            "multi-volume archives are not supported",
        ));
    }

    Ok(CentralDirectory {
        offset: eocd64.cd_offset,
        size: eocd64.cd_size,
        total_entries: eocd64.total_entries,
        end: locator.eocd64_offset,
    })
}

/// Builds an [`Entry`] from its central header, validating the local header
/// and the bounds of the entry data.
fn resolve_entry<R: Read + Seek>(
    source: &mut R,
    header: CentralHeader,
    cd_offset: u64,
) -> Result<Entry> {
    let name = decode_name(&header.raw_name, header.flags).ok_or_else(|| {
        ExtractionError::malformed(format!(
            "entry name is flagged UTF-8 but is not: {}",
            String::from_utf8_lossy(&header.raw_name)
        ))
    })?;
    if header.disk_number_start != 0 {
        return Err(ExtractionError::malformed(
            "multi-volume archives are not supported",
        ));
    }

    let out_of_bounds =
        || ExtractionError::malformed(format!("entry {name:?} points outside the archive data"));

    let local_end = header
        .header_offset
        .checked_add(LocalHeader::SIZE as u64)
        .filter(|end| *end <= cd_offset)
        .ok_or_else(out_of_bounds)?;
    tracing::trace!(entry = %name, offset = header.header_offset, end = local_end, "reading local header");

    let mut local_buf = [0u8; LocalHeader::SIZE];
    source.seek(SeekFrom::Start(header.header_offset))?;
    read_fully(source, &mut local_buf, "local file header")?;
    let local = LocalHeader::parse(&local_buf)?;

    let data_offset = header
        .header_offset
        .checked_add(local.data_start())
        .ok_or_else(out_of_bounds)?;
    data_offset
        .checked_add(header.compressed_size)
        .filter(|end| *end <= cd_offset)
        .ok_or_else(out_of_bounds)?;

    Ok(Entry {
        entry_type: infer_entry_type(&name, header.external_attributes, header.uncompressed_size),
        name,
        compression: CompressionMethod::from_u16(header.method),
        compressed_size: header.compressed_size,
        uncompressed_size: header.uncompressed_size,
        crc32: header.crc32,
        flags: header.flags,
        host_system: header.host_system(),
        external_attributes: header.external_attributes,
        header_offset: header.header_offset,
        data_offset,
    })
}

/// `read_exact` that reports a short read as a truncated archive.
fn read_fully<R: Read>(source: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    source.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ExtractionError::malformed(format!("truncated {what}"))
        } else {
            ExtractionError::Io(e)
        }
    })
}
