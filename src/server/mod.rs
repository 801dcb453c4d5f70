//! Network side of the mock server: accepting connections and answering
//! requests from the route table.

pub mod handler;
pub mod listener;

pub use handler::MockHandler;
