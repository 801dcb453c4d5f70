//! String and character literals.
//!
//! Strings are double-quoted, decode JSON-style escapes plus `\$`, expand
//! `${}` and `${str("...")}`, and may be followed by `.trim()` or
//! `.trim(charArrayOf('x', ...))` transforms.

use crate::dsl::cursor::{Cursor, Mismatch, Parsed};
use crate::dsl::keywords::{self, Keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

/// A string literal together with any trailing transforms.
pub fn string(cur: &Cursor<'_>, pos: usize) -> Parsed<String> {
    let (raw, pos) = quoted(cur, pos)?;
    transforms(cur, raw, pos)
}

/// At least one character, escape or interpolation between the quotes.
fn quoted(cur: &Cursor<'_>, pos: usize) -> Parsed<String> {
    let start = cur.char(pos, '"')?;
    let mut pos = start;
    let mut out = String::new();

    loop {
        match cur.peek(pos) {
            None => return Err(cur.mismatch(pos)),
            Some('"') if pos == start => return Err(cur.mismatch(pos)),
            Some('"') => return Ok((out, pos + 1)),
            Some('\\') => {
                let (c, next) = escape(cur, pos + 1, Quote::Double)?;
                out.push(c);
                pos = next;
            }
            Some('$') => match interpolation(cur, pos) {
                Ok((text, next)) => {
                    out.push_str(&text);
                    pos = next;
                }
                Err(_) => {
                    out.push('$');
                    pos += 1;
                }
            },
            Some(c) => {
                out.push(c);
                pos += c.len_utf8();
            }
        }
    }
}

/// Escape body, starting just past the backslash.
fn escape(cur: &Cursor<'_>, pos: usize, quote: Quote) -> Parsed<char> {
    let Some(c) = cur.peek(pos) else {
        return Err(cur.mismatch(pos));
    };

    let decoded = match c {
        'u' => {
            let (code, end) = cur.hex_digits(pos + 1, 4)?;
            return char::from_u32(code)
                .map(|c| (c, end))
                .ok_or_else(|| cur.mismatch(pos));
        }
        '"' => '"',
        '\'' if quote == Quote::Single => '\'',
        '$' if quote == Quote::Double => '$',
        '\\' => '\\',
        '/' => '/',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        _ => return Err(cur.mismatch(pos)),
    };

    Ok((decoded, pos + 1))
}

/// `${}` or `${ str("...") }`.
fn interpolation(cur: &Cursor<'_>, pos: usize) -> Parsed<String> {
    let pos = cur.char(pos, '$')?;
    let pos = cur.char(pos, '{')?;
    let pos = cur.inline_ws(pos);
    let (text, pos) = keywords::call(cur, pos, Keyword::Str, string)
        .unwrap_or_else(|_| (String::new(), pos));
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '}')?;
    Ok((text, pos))
}

fn transforms(cur: &Cursor<'_>, mut value: String, mut pos: usize) -> Parsed<String> {
    loop {
        let step = cur
            .char(pos, '.')
            .and_then(|p| keywords::call(cur, p, Keyword::Trim, trim_args));

        match step {
            Ok((chars, next)) => {
                value = trim(&value, &chars);
                pos = next;
            }
            Err(_) => return Ok((value, pos)),
        }
    }
}

fn trim_args(cur: &Cursor<'_>, pos: usize) -> Parsed<Vec<char>> {
    Ok(char_array(cur, pos).unwrap_or_else(|_| (Vec::new(), pos)))
}

/// Strips whitespace, or only the listed characters when any are given.
pub fn trim(value: &str, chars: &[char]) -> String {
    if chars.is_empty() {
        value.trim().to_string()
    } else {
        value.trim_matches(|c| chars.contains(&c)).to_string()
    }
}

/// `charArrayOf('a', 'b', ...)`.
pub fn char_array(cur: &Cursor<'_>, pos: usize) -> Parsed<Vec<char>> {
    keywords::call(cur, pos, Keyword::CharArrayOf, |cur, pos| {
        let (first, mut pos) = char_literal(cur, pos)?;
        let mut chars = vec![first];

        while let Ok((c, next)) = separated_char(cur, pos) {
            chars.push(c);
            pos = next;
        }

        Ok((chars, pos))
    })
}

fn separated_char(cur: &Cursor<'_>, pos: usize) -> Parsed<char> {
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, ',')?;
    let pos = cur.inline_ws(pos);
    char_literal(cur, pos)
}

/// A single-quoted character.
pub fn char_literal(cur: &Cursor<'_>, pos: usize) -> Parsed<char> {
    let pos = cur.char(pos, '\'')?;

    let (c, pos) = match cur.peek(pos) {
        Some('\\') => escape(cur, pos + 1, Quote::Single)?,
        Some('\'') | None => return Err(cur.mismatch(pos)),
        Some(c) => (c, pos + c.len_utf8()),
    };

    let pos = cur.char(pos, '\'')?;
    Ok((c, pos))
}

/// Parses `text` as exactly one string literal.
pub fn parse_string(text: &str) -> Result<String, Mismatch> {
    let cur = Cursor::new(text);
    let (value, pos) = string(&cur, 0)?;
    if !cur.is_eof(pos) {
        return Err(cur.mismatch(pos));
    }
    Ok(value)
}
