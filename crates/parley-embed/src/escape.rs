//! JavaScript string-literal escaping.
//!
//! Every user-controlled value written into a generated script goes through
//! [`escape_js_string`]. The output is valid inside either single- or
//! double-quoted literals and never contains a raw `<`, so the script can
//! also be inlined in an HTML `<script>` element.

use std::fmt::Write;

/// Escape `value` for use between JavaScript string quotes
///
/// Handles backslash, single quote, double quote, newline, carriage return
/// and tab, plus `<`, the U+2028/U+2029 line terminators and the remaining
/// control characters. Each input character is visited once, so an escape
/// sequence is never escaped a second time.
pub fn escape_js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\x3C"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
