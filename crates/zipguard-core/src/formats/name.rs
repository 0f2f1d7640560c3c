//! Entry name decoding.
//!
//! Names are UTF-8 when general purpose bit 11 is set. Older writers use IBM
//! code page 437; names without the flag are taken as UTF-8 when they decode
//! cleanly and as CP437 otherwise.

/// General purpose flag bit 11: name and comment are UTF-8.
const FLAG_UTF8: u16 = 0x0800;

/// CP437 characters for bytes 0x80..=0xFF.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Decodes a raw entry name according to the entry flags.
///
/// Returns `None` when the UTF-8 flag is set but the bytes are not UTF-8.
pub(crate) fn decode_name(raw: &[u8], flags: u16) -> Option<String> {
    match std::str::from_utf8(raw) {
        Ok(name) => Some(name.to_string()),
        Err(_) if flags & FLAG_UTF8 != 0 => None,
        Err(_) => Some(decode_cp437(raw)),
    }
}

fn decode_cp437(raw: &[u8]) -> String {
    raw.iter()
        .map(|&byte| {
            if byte.is_ascii() {
                char::from(byte)
            } else {
                CP437_HIGH[usize::from(byte - 0x80)]
            }
        })
        .collect()
}
