//! Fixed-layout zip records.
//!
//! All multi-byte fields are little-endian. Each `parse` takes a buffer that
//! starts at the record signature; a short buffer means the archive is
//! truncated and is reported as [`ExtractionError::MalformedArchive`].

use std::io::Cursor;
use std::io::Read;

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use byteorder::ReadBytesExt;

use crate::ExtractionError;
use crate::Result;

pub(crate) const EOCD_SIGNATURE: u32 = 0x0605_4b50;
pub(crate) const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4b50;
pub(crate) const ZIP64_EOCD_SIGNATURE: u32 = 0x0606_4b50;
pub(crate) const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
pub(crate) const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Extra field id of the ZIP64 extended information block.
const ZIP64_EXTRA_ID: u16 = 0x0001;

const U16_SENTINEL: u16 = 0xFFFF;
const U32_SENTINEL: u32 = 0xFFFF_FFFF;

fn truncated(record: &str) -> impl FnOnce(std::io::Error) -> ExtractionError + '_ {
    move |_| ExtractionError::malformed(format!("truncated {record}"))
}

fn check_signature(found: u32, expected: u32, record: &str) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(ExtractionError::malformed(format!(
            "bad {record} signature {found:#010x}"
        )))
    }
}

/// End of central directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub cd_disk: u16,
    pub entries_on_disk: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIZE: usize = 22;

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (signature, record) = Self::read(&mut Cursor::new(buf))
            .map_err(truncated("end of central directory record"))?;
        check_signature(signature, EOCD_SIGNATURE, "end of central directory")?;
        Ok(record)
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, Self)> {
        let signature = cursor.read_u32::<LittleEndian>()?;
        let record = Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            cd_disk: cursor.read_u16::<LittleEndian>()?,
            entries_on_disk: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        };
        Ok((signature, record))
    }

    /// Any saturated field means the real value lives in the ZIP64 record.
    pub const fn needs_zip64(&self) -> bool {
        self.disk_number == U16_SENTINEL
            || self.cd_disk == U16_SENTINEL
            || self.entries_on_disk == U16_SENTINEL
            || self.total_entries == U16_SENTINEL
            || self.cd_size == U32_SENTINEL
            || self.cd_offset == U32_SENTINEL
    }
}

/// ZIP64 end of central directory locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Zip64Locator {
    pub eocd64_disk: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64Locator {
    pub const SIZE: usize = 20;

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (signature, locator) =
            Self::read(&mut Cursor::new(buf)).map_err(truncated("zip64 locator"))?;
        check_signature(signature, ZIP64_LOCATOR_SIGNATURE, "zip64 locator")?;
        Ok(locator)
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, Self)> {
        let signature = cursor.read_u32::<LittleEndian>()?;
        let locator = Self {
            eocd64_disk: cursor.read_u32::<LittleEndian>()?,
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
            total_disks: cursor.read_u32::<LittleEndian>()?,
        };
        Ok((signature, locator))
    }
}

/// ZIP64 end of central directory record (fixed part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Zip64EndOfCentralDirectory {
    pub disk_number: u32,
    pub cd_disk: u32,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EndOfCentralDirectory {
    pub const MIN_SIZE: usize = 56;

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (signature, record) = Self::read(&mut Cursor::new(buf))
            .map_err(truncated("zip64 end of central directory"))?;
        check_signature(
            signature,
            ZIP64_EOCD_SIGNATURE,
            "zip64 end of central directory",
        )?;
        Ok(record)
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, Self)> {
        let signature = cursor.read_u32::<LittleEndian>()?;
        let _record_size = cursor.read_u64::<LittleEndian>()?;
        let _version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let disk_number = cursor.read_u32::<LittleEndian>()?;
        let cd_disk = cursor.read_u32::<LittleEndian>()?;
        let _entries_on_disk = cursor.read_u64::<LittleEndian>()?;
        let record = Self {
            disk_number,
            cd_disk,
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        };
        Ok((signature, record))
    }
}

/// Central directory file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentralHeader {
    pub version_made_by: u16,
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub disk_number_start: u32,
    pub external_attributes: u32,
    pub header_offset: u64,
    pub raw_name: Vec<u8>,
}

impl CentralHeader {
    pub const FIXED_SIZE: usize = 46;

    /// Reads one header and advances `cursor` past its variable fields.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let (signature, header) =
            Self::read(cursor).map_err(truncated("central directory header"))?;
        check_signature(signature, CENTRAL_HEADER_SIGNATURE, "central directory header")?;
        Ok(header)
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, Self)> {
        let signature = cursor.read_u32::<LittleEndian>()?;
        let version_made_by = cursor.read_u16::<LittleEndian>()?;
        let _version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let method = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()?;
        let extra_len = cursor.read_u16::<LittleEndian>()?;
        let comment_len = cursor.read_u16::<LittleEndian>()?;
        let disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let _internal_attributes = cursor.read_u16::<LittleEndian>()?;
        let external_attributes = cursor.read_u32::<LittleEndian>()?;
        let header_offset = cursor.read_u32::<LittleEndian>()?;

        let mut raw_name = vec![0u8; usize::from(name_len)];
        cursor.read_exact(&mut raw_name)?;
        let mut extra = vec![0u8; usize::from(extra_len)];
        cursor.read_exact(&mut extra)?;
        let mut comment = vec![0u8; usize::from(comment_len)];
        cursor.read_exact(&mut comment)?;

        let mut header = Self {
            version_made_by,
            flags,
            method,
            crc32,
            compressed_size: u64::from(compressed_size),
            uncompressed_size: u64::from(uncompressed_size),
            disk_number_start: u32::from(disk_number_start),
            external_attributes,
            header_offset: u64::from(header_offset),
            raw_name,
        };
        header.apply_zip64_extra(&extra)?;
        Ok((signature, header))
    }

    /// Replaces saturated fields with their ZIP64 values.
    ///
    /// Values appear in the extra block only for fields that are saturated,
    /// in the order uncompressed size, compressed size, header offset, disk.
    fn apply_zip64_extra(&mut self, extra: &[u8]) -> std::io::Result<()> {
        let mut rest = extra;
        while rest.len() >= 4 {
            let id = LittleEndian::read_u16(&rest[0..2]);
            let size = usize::from(LittleEndian::read_u16(&rest[2..4]));
            let end = (4 + size).min(rest.len());

            if id == ZIP64_EXTRA_ID {
                let mut block = Cursor::new(&rest[4..end]);
                if self.uncompressed_size == u64::from(U32_SENTINEL) {
                    self.uncompressed_size = block.read_u64::<LittleEndian>()?;
                }
                if self.compressed_size == u64::from(U32_SENTINEL) {
                    self.compressed_size = block.read_u64::<LittleEndian>()?;
                }
                if self.header_offset == u64::from(U32_SENTINEL) {
                    self.header_offset = block.read_u64::<LittleEndian>()?;
                }
                if self.disk_number_start == u32::from(U16_SENTINEL) {
                    self.disk_number_start = block.read_u32::<LittleEndian>()?;
                }
                return Ok(());
            }
            rest = &rest[end..];
        }
        Ok(())
    }

    /// Host system byte of "version made by".
    pub const fn host_system(&self) -> u8 {
        self.version_made_by.to_be_bytes()[0]
    }
}

/// Local file header (fixed part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalHeader {
    pub name_len: u16,
    pub extra_len: u16,
}

impl LocalHeader {
    pub const SIZE: usize = 30;

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (signature, header) =
            Self::read(&mut Cursor::new(buf)).map_err(truncated("local file header"))?;
        check_signature(signature, LOCAL_HEADER_SIGNATURE, "local file header")?;
        Ok(header)
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> std::io::Result<(u32, Self)> {
        let signature = cursor.read_u32::<LittleEndian>()?;
        // The central directory copy of version, flags, method, times, crc
        // and sizes is authoritative; only the variable lengths matter here.
        cursor.set_position(26);
        let header = Self {
            name_len: cursor.read_u16::<LittleEndian>()?,
            extra_len: cursor.read_u16::<LittleEndian>()?,
        };
        Ok((signature, header))
    }

    /// Bytes between the start of the header and the entry data.
    pub fn data_start(&self) -> u64 {
        Self::SIZE as u64 + u64::from(self.name_len) + u64::from(self.extra_len)
    }
}
