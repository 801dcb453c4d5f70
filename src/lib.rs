//! Mimic - mock HTTP responses from a route document
//!
//! A route document lists `METHOD "path-regex" { ... }` blocks. The document
//! is parsed once into a [`routes::RouteTable`]; each request is answered by
//! the first route whose method and path match, replaying its declared
//! status, headers and body.

pub mod config;
pub mod dsl;
pub mod hash;
pub mod http;
pub mod routes;
pub mod server;
