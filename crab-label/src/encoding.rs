//! Text encoding and escaping for printer field data
//!
//! ZPL labels declare UTF-8 (`^CI28`) and only need field escaping.
//! EPL and TSPL labels are single-byte Windows-1252:
//! - Characters outside the code page print as `?`
//! - Quoted fields escape `"` and `\`

use tracing::instrument;

/// Byte that replaces characters the code page cannot represent
const UNMAPPABLE: u8 = b'?';

/// Encode text as Windows-1252, replacing unmappable characters with `?`
pub fn encode_cp1252(s: &str) -> Vec<u8> {
    let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.encode(s);
    if !had_errors {
        return cow.into_owned();
    }

    // Slow path: encode per character so each failure costs one byte
    let mut result = Vec::with_capacity(s.len());
    let mut tmp = [0u8; 4];
    for c in s.chars() {
        let (cow, _, failed) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut tmp));
        if failed {
            result.push(UNMAPPABLE);
        } else {
            result.extend_from_slice(&cow);
        }
    }
    result
}

/// Width in characters as the printer counts them
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Escape a value placed between double quotes (EPL/TSPL)
pub fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape ZPL field data for use after `^FH`
///
/// Returns `None` when the value contains nothing that needs escaping.
#[instrument(level = "trace")]
pub fn escape_zpl(s: &str) -> Option<String> {
    if !s.contains(['^', '~', '_']) {
        return None;
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '^' => out.push_str("_5E"),
            '~' => out.push_str("_7E"),
            '_' => out.push_str("_5F"),
            other => out.push(other),
        }
    }
    Some(out)
}
