//! Turns parsed HTTP requests into responses from the route table.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::{self, Assembled, RouteTable};

/// Shared by every connection.
#[derive(Debug)]
pub struct MockHandler {
    table: Arc<RouteTable>,
    debug_routes_path: Option<String>,
}

impl MockHandler {
    pub fn new(table: Arc<RouteTable>, debug_routes_path: Option<String>) -> Self {
        Self {
            table,
            debug_routes_path,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Answers one request.
    ///
    /// Unmatched requests, and requests whose route cannot be dispatched,
    /// get `404 Not Found`. A body that cannot be read when served, or a
    /// declared status outside `0..=65535`, gets `500 Internal Server Error`.
    pub async fn handle(&self, req: &Request) -> Response {
        let path = req.route_path();

        if req.method == Method::GET && self.debug_routes_path.as_deref() == Some(path) {
            return ResponseBuilder::new(StatusCode::OK)
                .header("Content-Type", "text/plain; charset=UTF-8")
                .body(self.table.listing())
                .build();
        }

        let assembled = match self.dispatch(req.method, path) {
            Some(assembled) => assembled,
            None => {
                info!(method = %req.method, path = %path, status = 404, "No matching route");
                return Response::not_found();
            }
        };

        match render(&assembled).await {
            Ok(response) => {
                info!(
                    method = %req.method,
                    path = %path,
                    status = response.status.as_u16(),
                    "Served mock response"
                );
                response
            }
            Err(e) => {
                error!(method = %req.method, path = %path, error = %e, "Failed to serve mock response");
                Response::internal_error()
            }
        }
    }

    /// Finds and assembles the route for a request. `HEAD` falls back to the
    /// `GET` routes when no `HEAD` route matches. Dispatch faults are logged
    /// and treated as no match.
    pub fn dispatch(&self, method: Method, path: &str) -> Option<Assembled> {
        let table = self.table.routes();
        let result = routes::find(table, method, path)
            .and_then(|route| match route {
                None if method == Method::HEAD => routes::find(table, Method::GET, path),
                found => Ok(found),
            })
            .and_then(|route| route.map(routes::assemble).transpose());

        match result {
            Ok(assembled) => assembled,
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Route dispatch failed");
                None
            }
        }
    }
}

/// Reads the body and writes out status, headers and resolved metadata.
///
/// Statuses that forbid a body (1xx, 204, 304) are sent with neither payload
/// nor Content-Length.
pub async fn render(assembled: &Assembled) -> anyhow::Result<Response> {
    let status = u16::try_from(assembled.status)
        .map(StatusCode)
        .with_context(|| format!("status {} is not a valid HTTP status", assembled.status))?;

    let mut builder = ResponseBuilder::new(status);
    for (name, value) in &assembled.headers {
        builder = builder.header(name, value);
    }

    let meta = assembled.body.meta();
    if let Some(content_type) = &meta.content_type {
        builder = builder.header("Content-Type", content_type.to_string());
    }

    if status.forbids_body() {
        return Ok(builder.build());
    }

    let payload = assembled.body.payload().await.with_context(|| match assembled.body.path() {
        Some(path) => format!("reading body file {}", path.display()),
        None => "reading body".to_string(),
    })?;

    if let Some(length) = meta.content_length {
        if length != payload.len() as u64 {
            warn!(declared = length, actual = payload.len(), "Declared Content-Length differs from body size");
        }
        builder = builder.header("Content-Length", length.to_string());
    }

    Ok(builder.body(payload.to_vec()).build())
}
