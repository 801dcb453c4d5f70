//! Route-document grammar.
//!
//! ```text
//! document    := ws* route (ws+ route)* ws*
//! route       := METHOD iws* string iws* '{' iws* '\n' response iws* '\n' ws* '}'
//! response    := ws* declaration (ws+ declaration)*
//! declaration := ( body.file_hash(file, alg) | body.file(path) | body(text)
//!                | body = str(text) | body = file_hash(file, alg) | body = file(path)
//!                | status(digits) | status = digits
//!                | header(key, value) ) iws* ';'?
//! ```
//!
//! `iws` is spaces and tabs; `ws` is any whitespace. Keywords ignore case.

use tracing::debug;

use crate::dsl::cursor::{Cursor, Mismatch, Parsed};
use crate::dsl::keywords::{self, Keyword};
use crate::dsl::literal;
use crate::hash;
use crate::http::request::Method;
use crate::routes::model::{Body, MockResponse, MockResponseBuilder, PathPattern, Route};

/// One line inside a route block.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Body(Body),
    Status(u32),
    Header(String, String),
}

/// The whole document. Anything left unconsumed is a mismatch.
pub fn document(cur: &Cursor<'_>, pos: usize) -> Parsed<Vec<Route>> {
    let pos = cur.ws(pos);
    let (first, mut pos) = route(cur, pos)?;
    let mut routes = vec![first];

    while let Ok((next, end)) = cur.ws1(pos).and_then(|p| route(cur, p)) {
        routes.push(next);
        pos = end;
    }

    let pos = cur.ws(pos);
    if !cur.is_eof(pos) {
        return Err(cur.mismatch(pos));
    }
    Ok((routes, pos))
}

pub fn route(cur: &Cursor<'_>, pos: usize) -> Parsed<Route> {
    let (method, pos) = method(cur, pos)?;
    let pos = cur.inline_ws(pos);
    let (path, pos) = literal::string(cur, pos)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '{')?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '\n')?;
    let (response, pos) = response(cur, pos)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '\n')?;
    let pos = cur.ws(pos);
    let pos = cur.char(pos, '}')?;

    let route = Route {
        method,
        path: PathPattern::new(path),
        response,
    };
    Ok((route, pos))
}

/// One of the standard verbs, any case.
pub fn method(cur: &Cursor<'_>, pos: usize) -> Parsed<Method> {
    Method::ALL
        .into_iter()
        .find_map(|m| cur.literal_ignore_case(pos, m.as_str()).ok().map(|end| (m, end)))
        .ok_or_else(|| cur.mismatch(pos))
}

pub fn response(cur: &Cursor<'_>, pos: usize) -> Parsed<MockResponse> {
    let pos = cur.ws(pos);
    let (first, mut pos) = declaration(cur, pos)?;

    let mut builder = MockResponseBuilder::new();
    apply(&mut builder, first);

    while let Ok((next, end)) = cur.ws1(pos).and_then(|p| declaration(cur, p)) {
        apply(&mut builder, next);
        pos = end;
    }

    Ok((builder.build(), pos))
}

fn apply(builder: &mut MockResponseBuilder, declaration: Declaration) {
    match declaration {
        Declaration::Body(body) => builder.body(body),
        Declaration::Status(status) => builder.status(status),
        Declaration::Header(name, value) => builder.header(name, value),
    };
}

/// A single declaration with its optional trailing semicolon.
pub fn declaration(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    let alternatives: [fn(&Cursor<'_>, usize) -> Parsed<Declaration>; 5] = [
        body_call,
        body_assignment,
        status_call,
        status_assignment,
        header,
    ];

    let (declaration, end) = alternatives
        .iter()
        .find_map(|rule| rule(cur, pos).ok())
        .ok_or_else(|| cur.mismatch(pos))?;

    let end = cur.inline_ws(end);
    let end = cur.char(end, ';').unwrap_or(end);
    Ok((declaration, end))
}

/// `body.file_hash(...)`, `body.file(...)` or `body(...)`.
fn body_call(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    keywords::call(cur, pos, Keyword::BodyFileHash, file_hash_args)
        .and_then(|(args, end)| file_hash_body(cur, pos, args).map(|body| (body, end)))
        .or_else(|_| keywords::call(cur, pos, Keyword::BodyFile, literal::string).map(file_body))
        .or_else(|_| keywords::call(cur, pos, Keyword::Body, literal::string).map(text_body))
        .map(|(body, end)| (Declaration::Body(body), end))
}

/// `body = str(...)`, `body = file_hash(...)` or `body = file(...)`.
fn body_assignment(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    let value = assignment(cur, pos, Keyword::Body)?;

    keywords::call(cur, value, Keyword::Str, literal::string)
        .map(text_body)
        .or_else(|_| {
            keywords::call(cur, value, Keyword::FileHash, file_hash_args)
                .and_then(|(args, end)| file_hash_body(cur, pos, args).map(|body| (body, end)))
        })
        .or_else(|_| keywords::call(cur, value, Keyword::File, literal::string).map(file_body))
        .map(|(body, end)| (Declaration::Body(body), end))
}

/// `status(200)` and its synonyms.
fn status_call(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    let (digits, end) = keywords::call(cur, pos, Keyword::Status, |cur, pos| cur.digits(pos))?;
    status_value(digits, end)
}

/// `status = 200` and its synonyms.
fn status_assignment(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    let value = assignment(cur, pos, Keyword::Status)?;
    let (digits, end) = cur.digits(value)?;
    status_value(digits, end)
}

/// Any run of digits is a status; values past `u32::MAX` saturate.
fn status_value(digits: &str, end: usize) -> Parsed<Declaration> {
    let status = digits.parse::<u32>().unwrap_or(u32::MAX);
    Ok((Declaration::Status(status), end))
}

/// `header(key, value)`, each argument optionally labelled.
fn header(cur: &Cursor<'_>, pos: usize) -> Parsed<Declaration> {
    let ((name, value), end) = keywords::call(cur, pos, Keyword::Header, |cur, pos| {
        keywords::pair(
            cur,
            pos,
            |cur, pos| keywords::labelled(cur, pos, Keyword::KeyArg, literal::string),
            |cur, pos| keywords::labelled(cur, pos, Keyword::ValueArg, literal::string),
        )
    })?;
    Ok((Declaration::Header(name, value), end))
}

/// `keyword =`, returning the position after the equals sign and any spacing.
fn assignment(cur: &Cursor<'_>, pos: usize, name: Keyword) -> Result<usize, Mismatch> {
    let pos = keywords::keyword(cur, pos, name)?;
    let pos = cur.inline_ws(pos);
    let pos = cur.char(pos, '=')?;
    Ok(cur.inline_ws(pos))
}

fn file_hash_args(cur: &Cursor<'_>, pos: usize) -> Parsed<(String, String)> {
    keywords::pair(
        cur,
        pos,
        |cur, pos| keywords::labelled(cur, pos, Keyword::FileArg, literal::string),
        |cur, pos| keywords::labelled(cur, pos, Keyword::AlgorithmArg, literal::string),
    )
}

/// Hashes the file now; a failure makes the declaration not match.
fn file_hash_body(cur: &Cursor<'_>, pos: usize, (file, algorithm): (String, String)) -> Result<Body, Mismatch> {
    match hash::hash_file(&file, &algorithm) {
        Ok(digest) => Ok(Body::text(digest)),
        Err(e) => {
            debug!(file = %file, algorithm = %algorithm, error = %e, "file_hash declaration rejected");
            Err(cur.mismatch(pos))
        }
    }
}

fn text_body((text, end): (String, usize)) -> (Body, usize) {
    (Body::text(text), end)
}

fn file_body((path, end): (String, usize)) -> (Body, usize) {
    (Body::file(path), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_declaration(text: &str) -> Option<Declaration> {
        let cur = Cursor::new(text);
        declaration(&cur, 0)
            .ok()
            .filter(|(_, end)| *end == text.len())
            .map(|(d, _)| d)
    }

    #[test]
    fn method_ignores_case() {
        let cur = Cursor::new("pAtCh");
        assert_eq!(method(&cur, 0), Ok((Method::PATCH, 5)));

        let cur = Cursor::new("PURGE");
        assert!(method(&cur, 0).is_err());
    }

    #[test]
    fn status_forms() {
        for text in ["status(201)", "STATUS_CODE( 201 );", "statuscode(201)", "status = 201", "status_code=201;"] {
            assert_eq!(parse_declaration(text), Some(Declaration::Status(201)), "{text}");
        }
    }

    #[test]
    fn status_is_not_range_checked() {
        assert_eq!(parse_declaration("status(70000)"), Some(Declaration::Status(70000)));
        assert_eq!(
            parse_declaration("status = 99999999999999"),
            Some(Declaration::Status(u32::MAX))
        );
    }

    #[test]
    fn header_labels() {
        let expected = Some(Declaration::Header("X-Foo".into(), "bar".into()));
        assert_eq!(parse_declaration(r#"header("X-Foo", "bar")"#), expected);
        assert_eq!(parse_declaration(r#"header(key = "X-Foo", value: "bar");"#), expected);
        assert_eq!(parse_declaration(r#"Header(name:"X-Foo",VALUE="bar")"#), expected);
    }

    #[test]
    fn body_forms() {
        let expected = Some(Declaration::Body(Body::text("hi")));
        assert_eq!(parse_declaration(r#"body("hi")"#), expected);
        assert_eq!(parse_declaration(r#"body = str("hi");"#), expected);
        assert_eq!(parse_declaration(r#"BODY ( " hi ".trim() )"#), expected);
    }

    #[test]
    fn body_file_forms() {
        for text in [r#"body.file("site/index.html")"#, r#"body = file("site/index.html")"#] {
            let Some(Declaration::Body(body)) = parse_declaration(text) else {
                panic!("{text} did not parse");
            };
            assert_eq!(body.path(), Some(std::path::Path::new("site/index.html")));
        }
    }

    #[test]
    fn missing_hash_file_does_not_match() {
        assert_eq!(
            parse_declaration(r#"body.file_hash("/no/such/file", "MD5")"#),
            None
        );
    }

    #[test]
    fn unknown_declaration_does_not_match() {
        assert_eq!(parse_declaration(r#"cookie("a", "b")"#), None);
        assert_eq!(parse_declaration(r#"header("only-one")"#), None);
    }
}
