//! Input checks shared by the widget config merge, the HTTP layer and the relay.

/// Longest embed code accepted from a public URL
pub const MAX_EMBED_CODE_LEN: usize = 64;

/// URL-safe token: ASCII alphanumerics, `-` and `_`
pub fn is_valid_embed_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_EMBED_CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// `#RGB`, `#RRGGBB` or `#RRGGBBAA`
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
