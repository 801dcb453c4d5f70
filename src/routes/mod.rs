//! Parsed mock routes: the data model, the process-wide table, and request
//! matching.

pub mod matcher;
pub mod model;
pub mod table;

pub use matcher::{Assembled, DispatchError, assemble, find};
pub use model::{Body, BodyMeta, DEFAULT_STATUS, MockResponse, MockResponseBuilder, PathPattern, Route, StreamSource};
pub use table::RouteTable;
