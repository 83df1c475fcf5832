//! Properties text format
//!
//! Line-oriented `key=value` text:
//! - `#` and `!` start comment lines, blank lines are skipped
//! - `=`, `:` or whitespace separate key from value
//! - a line ending in an odd number of backslashes continues on the next line
//! - escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX`; any other escaped char stands for itself
//!
//! Leading and trailing whitespace around keys and values is dropped.

use std::borrow::Cow;
use std::str::Chars;

use crate::error::{Error, Result, SourceLocation};
use crate::properties::PropertySet;

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Decode raw bytes as text
///
/// UTF-8 is tried first; anything else is read as ISO-8859-1, the
/// traditional encoding of properties files.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Parse properties text
///
/// `source` names the text in error messages.
pub fn parse(text: &str, source: &str) -> Result<PropertySet> {
    let mut props = PropertySet::new();

    for line in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&line.text);
        let position = || SourceLocation {
            file: source.to_string(),
            line: Some(line.number),
        };

        let key =
            unescape(raw_key).map_err(|e| Error::parse(e).with_source_location(position()))?;
        let value = unescape(trim_value_end(raw_value))
            .map_err(|e| Error::parse(e).with_source_location(position()))?;

        props.insert(key, value);
    }

    Ok(props)
}

/// Parse raw bytes, see [`decode`] and [`parse`]
pub fn parse_bytes(bytes: &[u8], source: &str) -> Result<PropertySet> {
    parse(&decode(bytes), source)
}

/// Render a set as properties text, one entry per line
pub fn write(props: &PropertySet) -> String {
    let mut out = String::new();
    for (key, value) in props.iter() {
        escape_into(&mut out, key, true);
        out.push('=');
        escape_into(&mut out, value, false);
        out.push('\n');
    }
    out
}

struct LogicalLine {
    /// 1-based number of the first natural line
    number: usize,
    text: String,
}

fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut current: Option<LogicalLine> = None;

    for (index, natural) in natural_lines(text).enumerate() {
        let trimmed = natural.trim_start_matches(is_whitespace);

        let mut line = match current.take() {
            Some(mut line) => {
                line.text.push_str(trimmed);
                line
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with(['#', '!']) {
                    continue;
                }
                LogicalLine {
                    number: index + 1,
                    text: trimmed.to_string(),
                }
            }
        };

        let trailing = line.text.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            line.text.pop();
            current = Some(line);
        } else {
            lines.push(line);
        }
    }

    // A continuation backslash on the last line just ends the entry
    lines.extend(current);
    lines
}

/// Split on `\r\n`, `\n` or a lone `\r`
fn natural_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(['\r', '\n']) {
            Some(end) => {
                let mut after = &current[end + 1..];
                if current.as_bytes()[end] == b'\r' {
                    after = after.strip_prefix('\n').unwrap_or(after);
                }
                rest = (!after.is_empty()).then_some(after);
                Some(&current[..end])
            }
            None => {
                rest = None;
                (!current.is_empty()).then_some(current)
            }
        }
    })
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_whitespace(c) {
            key_end = i;
            break;
        }
    }

    let rest = line[key_end..].trim_start_matches(is_whitespace);
    let rest = rest
        .strip_prefix(['=', ':'])
        .unwrap_or(rest)
        .trim_start_matches(is_whitespace);

    (&line[..key_end], rest)
}

/// Drop trailing whitespace unless the last whitespace char is escaped
fn trim_value_end(value: &str) -> &str {
    let trimmed = value.trim_end_matches(is_whitespace);
    let backslashes = trimmed.chars().rev().take_while(|c| *c == '\\').count();

    if backslashes % 2 == 1 && trimmed.len() < value.len() {
        // trimmed chars are all single-byte
        &value[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => out.push(unicode_escape(&mut chars)?),
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn unicode_escape(chars: &mut Chars<'_>) -> std::result::Result<char, String> {
    let high = read_hex4(chars).ok_or_else(|| "Malformed \\uxxxx encoding".to_string())?;

    if (0xD800..0xDC00).contains(&high) {
        // Surrogate pair written as two escapes
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_hex4(&mut lookahead) {
                if (0xDC00..0xE000).contains(&low) {
                    *chars = lookahead;
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| format!("Invalid surrogate pair \\u{:04X}", high));
                }
            }
        }
    }

    Ok(char::from_u32(high).unwrap_or_else(|| {
        log::warn!(
            "Unpaired surrogate \\u{:04X}, using U+FFFD instead",
            high
        );
        char::REPLACEMENT_CHARACTER
    }))
}

fn read_hex4(chars: &mut Chars<'_>) -> Option<u32> {
    let mut value = 0;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
}
