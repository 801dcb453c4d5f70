//! The route-definition language.
//!
//! A document is a list of route blocks:
//!
//! ```text
//! GET "/users/[0-9]+" {
//!     status(200);
//!     header("Content-Type", "application/json");
//!     body("{\"id\": 1}");
//! }
//!
//! post "/upload" {
//!     status_code = 201
//!     body.file_hash(path: "fixtures/upload.bin", alg: "SHA-256")
//! }
//! ```
//!
//! Parsing is a backtracking recursive descent over a [`cursor::Cursor`]:
//! each rule takes a byte offset and returns either its value and the next
//! offset or a [`Mismatch`]. A document that does not parse in full yields
//! no routes at all.

pub mod cursor;
pub mod grammar;
pub mod keywords;
pub mod literal;

pub use cursor::{Cursor, Mismatch, Parsed};

use crate::routes::model::Route;

/// Folds CRLF and LFCR line endings to LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace("\n\r", "\n")
}

/// Why a document was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentError {
    /// Furthest byte offset any rule got to before failing.
    pub pos: usize,
    pub line: usize,
    pub column: usize,
}

/// Parses an already newline-normalized document.
pub fn parse_document(text: &str) -> Result<Vec<Route>, DocumentError> {
    let cur = Cursor::new(text);
    grammar::document(&cur, 0).map(|(routes, _)| routes).map_err(|_| {
        let pos = cur.furthest();
        let (line, column) = cur.line_col(pos);
        DocumentError { pos, line, column }
    })
}

/// Normalizes newlines and parses; a document that does not parse gives an
/// empty route list.
pub fn parse_routes(text: &str) -> Vec<Route> {
    parse_document(&normalize_newlines(text)).unwrap_or_default()
}
