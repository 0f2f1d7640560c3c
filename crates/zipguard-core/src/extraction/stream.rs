//! Bounded, checksummed copy of entry content.

use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;

use flate2::CrcReader;

use crate::ExtractionError;
use crate::IntegrityMismatch;
use crate::Result;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copies an entry's decoded content into `writer`, verifying it.
///
/// At most `expected_size + 1` bytes are read so an entry that decodes to
/// more than it declares is detected without writing unbounded data.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns `IntegrityMismatch` when the byte count or CRC-32 disagrees with
/// the recorded values or the decoder rejects the compressed data, and `Io`
/// if the source cannot be read or writing fails.
pub fn copy_validated<R: Read, W: Write>(
    reader: R,
    writer: &mut W,
    name: &str,
    expected_size: u64,
    expected_crc: u32,
) -> Result<u64> {
    let mut checked = CrcReader::new(reader.take(expected_size.saturating_add(1)));
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut actual = 0u64;

    loop {
        let n = match checked.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_decode_error(&e) => {
                tracing::debug!(entry = name, error = %e, "decoder rejected entry data");
                return Err(ExtractionError::IntegrityMismatch {
                    path: name.to_string(),
                    mismatch: IntegrityMismatch::Corrupt { decoded: actual },
                });
            }
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buffer[..n])?;
        actual += n as u64;
    }

    let mismatch = if actual == expected_size {
        let actual_crc = checked.crc().sum();
        (actual_crc != expected_crc).then_some(IntegrityMismatch::Crc {
            expected: expected_crc,
            actual: actual_crc,
        })
    } else {
        Some(IntegrityMismatch::Size {
            expected: expected_size,
            actual,
        })
    };

    match mismatch {
        Some(mismatch) => Err(ExtractionError::IntegrityMismatch {
            path: name.to_string(),
            mismatch,
        }),
        None => Ok(actual),
    }
}

/// Decoders report malformed input as `InvalidInput` or `InvalidData`.
fn is_decode_error(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::InvalidInput | ErrorKind::InvalidData)
}
