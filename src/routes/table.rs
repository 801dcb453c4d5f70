use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use crate::dsl;
use crate::routes::model::Route;

/// The routes of one route document, loaded on first use and kept for the
/// life of the process.
///
/// Concurrent first callers block on the same load, so the document is read
/// and parsed exactly once. Afterwards reads are plain shared borrows.
#[derive(Debug)]
pub struct RouteTable {
    source: Option<PathBuf>,
    routes: OnceCell<Vec<Route>>,
}

impl RouteTable {
    /// A table backed by the document at `path`; nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            routes: OnceCell::new(),
        }
    }

    /// A table that already holds `routes`.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self {
            source: None,
            routes: OnceCell::with_value(routes),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.routes.get().is_some()
    }

    /// The routes, in declaration order.
    pub fn routes(&self) -> &[Route] {
        self.routes.get_or_init(|| match &self.source {
            Some(path) => load(path),
            None => Vec::new(),
        })
    }

    /// Plain-text listing, one route per line.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for route in self.routes() {
            let _ = writeln!(out, "{}", route);
        }
        out
    }
}

fn load(path: &Path) -> Vec<Route> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read route document");
            return Vec::new();
        }
    };

    match dsl::parse_document(&dsl::normalize_newlines(&text)) {
        Ok(routes) => {
            info!(path = %path.display(), routes = routes.len(), "Route table loaded");
            routes
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                line = e.line,
                column = e.column,
                "Route document did not parse, serving no routes"
            );
            Vec::new()
        }
    }
}
