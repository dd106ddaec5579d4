//! Low-level helpers for byte literals and source text decoding.

use std::sync::OnceLock;

use encoding_rs::Encoding;
use regex::Regex;

use super::types::error::{Result, TalkieError};

static BYTE_LITERAL: OnceLock<Regex> = OnceLock::new();

/// Returns the cached byte literal pattern: `0x` followed by one or two hex digits.
fn byte_literal_regex() -> &'static Regex {
    BYTE_LITERAL.get_or_init(|| Regex::new(r"^0x[0-9A-Fa-f]{1,2}$").expect("Invalid byte literal regex pattern"))
}

/// Whether `token` is a well-formed byte literal such as `0x0A` or `0xf`.
pub fn is_byte_literal(token: &str) -> bool {
    byte_literal_regex().is_match(token)
}

/// Decode a `0xHH` literal into its byte value.
///
/// Returns `None` if the prefix is missing or the digits are not one or two
/// hexadecimal characters.
pub fn decode_hex_byte(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("0x")?;
    let padded = match digits.len() {
        1 => format!("0{}", digits),
        2 => digits.to_string(),
        _ => return None,
    };
    let mut out = [0u8; 1];
    hex::decode_to_slice(padded, &mut out).ok()?;
    Some(out[0])
}

/// Resolve an encoding label such as `utf-8` or `windows-1252`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| TalkieError::InvalidOption(format!("Unknown text encoding: {}", label)))
}

/// Decode raw source bytes to text. A byte order mark overrides `encoding`.
pub fn decode_source(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("Source contained bytes invalid in {}; replaced", used.name());
    }
    text.into_owned()
}
