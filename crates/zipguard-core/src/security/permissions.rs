//! File mode sanitization.

/// Mode applied to extracted files unless archive permissions are preserved.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Bits that are never carried over from an archive: setuid, setgid and
/// sticky, plus group and other write.
const STRIPPED_BITS: u32 = 0o7000 | 0o022;

/// Reduces an archive-supplied Unix mode to safe permission bits.
///
/// File type bits are dropped along with the stripped bits.
///
/// # Examples
///
/// ```
/// use zipguard_core::security::sanitize_mode;
///
/// assert_eq!(sanitize_mode(0o104_755), 0o755);
/// assert_eq!(sanitize_mode(0o100_666), 0o644);
/// ```
#[must_use]
pub const fn sanitize_mode(mode: u32) -> u32 {
    mode & 0o7777 & !STRIPPED_BITS
}

/// Picks the mode for an extracted file.
///
/// `archive_mode` is only honored when `preserve` is set.
#[must_use]
pub const fn effective_mode(archive_mode: Option<u32>, preserve: bool) -> u32 {
    match archive_mode {
        Some(mode) if preserve => sanitize_mode(mode),
        _ => DEFAULT_FILE_MODE,
    }
}
