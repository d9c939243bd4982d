//! Conversions between byte offsets and editor positions.
//!
//! Columns are UTF-16 code units, lines are split on `\n` with a trailing `\r`
//! treated as part of the line terminator.

use crate::types::{TextPosition, TextRange};

pub fn position_at(text: &str, offset: usize) -> TextPosition {
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    TextPosition::new(line, before[line_start..].encode_utf16().count())
}

/// Byte offset of `pos`, or `None` if it lies outside the text or inside a character
pub fn offset_at(text: &str, pos: TextPosition) -> Option<usize> {
    let mut line_start = 0;
    for (idx, raw_line) in text.split('\n').enumerate() {
        if idx == pos.line {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            let mut units = 0;
            for (byte, ch) in line.char_indices() {
                if units == pos.character {
                    return Some(line_start + byte);
                }
                if units > pos.character {
                    return None;
                }
                units += ch.len_utf16();
            }
            return (units == pos.character).then_some(line_start + line.len());
        }
        line_start += raw_line.len() + 1;
    }
    None
}

pub fn text_in_range(text: &str, range: TextRange) -> Option<&str> {
    let start = offset_at(text, range.start)?;
    let end = offset_at(text, range.end)?;
    text.get(start..end)
}

/// `text` without a leading UTF-8 byte order mark
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Offset of the `{` opening the top-level object, if the text is one
pub fn root_object(text: &str) -> Option<usize> {
    let body = text.trim_start();
    body.starts_with('{').then(|| text.len() - body.len())
}

/// Offset of the opening quote of member `key` of the object whose `{` is at
/// `object_start`. Keys of nested objects and string values are skipped.
pub fn find_member(text: &str, object_start: usize, key: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(object_start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = object_start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return None;
                }
            }
            b'"' => {
                let end = string_end(bytes, i)?;
                if depth == 1 && &text[i + 1..end] == key && is_followed_by_colon(text, end) {
                    return Some(i);
                }
                i = end;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset of the `{` opening the object value of the member whose key starts at `key_at`
pub fn object_value(text: &str, key_at: usize) -> Option<usize> {
    let end = string_end(text.as_bytes(), key_at)?;
    let value = text[end + 1..].trim_start().strip_prefix(':')?.trim_start();
    value.starts_with('{').then(|| text.len() - value.len())
}

/// Index of the quote closing the string that opens at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn is_followed_by_colon(text: &str, string_end: usize) -> bool {
    text[string_end + 1..].trim_start().starts_with(':')
}
