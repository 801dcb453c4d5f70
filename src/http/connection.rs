use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::handler::MockHandler;

const READ_CHUNK: usize = 4096;

/// One client connection, driven through [`ConnectionState`] until the peer
/// goes away or a response cannot be framed for reuse.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    handler: Arc<MockHandler>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    /// Response in flight and whether to read another request afterwards.
    Writing(ResponseWriter, bool),
    Closed,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, handler: Arc<MockHandler>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::Reading,
            handler,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let response = self.handler.handle(&req).await;
                    let keep_alive = req.keep_alive() && is_framed(&response);
                    let include_body = req.method != Method::HEAD;

                    ConnectionState::Writing(ResponseWriter::new(&response, include_body), keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::Reading
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => return Ok(()),
            };
        }
    }

    /// Next complete request, or `None` once the peer has closed.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }
                Err(ParseError::Incomplete) => {}
                Err(e) => return Err(anyhow::anyhow!("HTTP parse error: {}", e)),
            }

            self.buffer.reserve(READ_CHUNK);
            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if !self.buffer.is_empty() {
                    debug!(pending = self.buffer.len(), "Peer closed mid-request");
                }
                return Ok(None);
            }
        }
    }
}

/// Whether the next request on the connection can be found after this
/// response: it either has no body by status or declares its exact length.
fn is_framed(response: &Response) -> bool {
    if response.status.forbids_body() {
        return true;
    }
    response
        .header("Content-Length")
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len == response.body.len())
}
