//! Keywords of the route language and the spellings each one accepts.
//!
//! Every keyword is matched case-insensitively and must end on a word
//! boundary, so `status` never matches the front of `status_code`.

use crate::dsl::cursor::{Cursor, Mismatch, Parsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `body(...)`, or the left side of `body = ...`.
    Body,
    BodyFile,
    BodyFileHash,
    /// Right-hand sides of `body = ...`.
    Str,
    File,
    FileHash,
    Status,
    Header,
    /// Argument labels.
    FileArg,
    AlgorithmArg,
    KeyArg,
    ValueArg,
    /// String transforms.
    Trim,
    CharArrayOf,
}

/// Accepted spellings per keyword, longest first.
static SPELLINGS: &[(Keyword, &[&str])] = &[
    (Keyword::Body, &["body"]),
    (Keyword::BodyFile, &["body.file"]),
    (Keyword::BodyFileHash, &["body.file_hash"]),
    (Keyword::Str, &["str"]),
    (Keyword::File, &["file"]),
    (Keyword::FileHash, &["file_hash"]),
    (Keyword::Status, &["status_code", "statuscode", "status"]),
    (Keyword::Header, &["header"]),
    (
        Keyword::FileArg,
        &["file_name", "file_path", "filename", "filepath", "file", "name", "path"],
    ),
    (Keyword::AlgorithmArg, &["algorithm", "hash", "alg"]),
    (Keyword::KeyArg, &["name", "key"]),
    (Keyword::ValueArg, &["value"]),
    (Keyword::Trim, &["trim"]),
    (Keyword::CharArrayOf, &["charArrayOf"]),
];

impl Keyword {
    pub fn spellings(self) -> &'static [&'static str] {
        SPELLINGS
            .iter()
            .find(|(keyword, _)| *keyword == self)
            .map(|(_, spellings)| *spellings)
            .unwrap_or(&[])
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Matches any spelling of `keyword`.
pub fn keyword(cur: &Cursor<'_>, pos: usize, keyword: Keyword) -> Result<usize, Mismatch> {
    for spelling in keyword.spellings() {
        if let Ok(end) = cur.literal_ignore_case(pos, spelling) {
            if !cur.peek(end).is_some_and(is_word_char) {
                return Ok(end);
            }
        }
    }
    Err(cur.mismatch(pos))
}

/// `keyword ( args )`, with inline whitespace allowed around every token.
pub fn call<'src, T>(
    cur: &Cursor<'src>,
    pos: usize,
    name: Keyword,
    args: impl Fn(&Cursor<'src>, usize) -> Parsed<T>,
) -> Parsed<T> {
    let pos = keyword(cur, pos, name)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '(')?;
    let pos = cur.inline_ws(pos);
    let (value, pos) = args(cur, pos)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, ')')?;
    Ok((value, cur.inline_ws(pos)))
}

/// An argument with an optional `label =` or `label:` prefix.
pub fn labelled<'src, T>(
    cur: &Cursor<'src>,
    pos: usize,
    label: Keyword,
    value: impl Fn(&Cursor<'src>, usize) -> Parsed<T>,
) -> Parsed<T> {
    let after_label = keyword(cur, pos, label)
        .map(|p| cur.inline_ws(p))
        .and_then(|p| cur.char_in(p, &['=', ':']))
        .map(|(_, p)| cur.inline_ws(p));

    value(cur, after_label.unwrap_or(pos))
}

/// `left , right`.
pub fn pair<'src, A, B>(
    cur: &Cursor<'src>,
    pos: usize,
    left: impl Fn(&Cursor<'src>, usize) -> Parsed<A>,
    right: impl Fn(&Cursor<'src>, usize) -> Parsed<B>,
) -> Parsed<(A, B)> {
    let (a, pos) = left(cur, pos)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, ',')?;
    let pos = cur.inline_ws(pos);
    let (b, pos) = right(cur, pos)?;
    Ok(((a, b), pos))
}
