//! Character reference decoding
//!
//! Only the references playground snippets actually use are named here;
//! anything else is left in the text literally.

/// Decode a named character reference (without `&` and `;`)
pub fn decode_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{00A0}",
        "copy" => "\u{00A9}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        _ => return None,
    };
    Some(decoded)
}

/// Decode a numeric character reference body: `65` or `x41`
pub fn decode_numeric(s: &str) -> Option<char> {
    let code = match s.strip_prefix('x').or_else(|| s.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => s.parse().ok()?,
    };
    match code {
        0 => Some('\u{FFFD}'),
        _ => char::from_u32(code),
    }
}
