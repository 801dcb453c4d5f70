use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Encodes a response for the wire. Without `include_body` (HEAD requests)
/// the head is kept as-is, Content-Length included, and the payload dropped.
/// Statuses that forbid a body never write one.
pub fn serialize_response(resp: &Response, include_body: bool) -> Bytes {
    let include_body = include_body && !resp.status.forbids_body();
    let head_len: usize = resp
        .headers
        .iter()
        .map(|(k, v)| k.len() + v.len() + 4)
        .sum();
    let body_len = if include_body { resp.body.len() } else { 0 };
    let mut buf = BytesMut::with_capacity(32 + head_len + body_len);

    buf.put_slice(
        format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            resp.status.as_u16(),
            resp.status.reason_phrase()
        )
        .as_bytes(),
    );

    for (name, value) in &resp.headers {
        buf.put_slice(name.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }
    buf.put_slice(b"\r\n");

    if include_body {
        buf.put_slice(&resp.body);
    }

    buf.freeze()
}

/// An encoded response being written out; what remains in `pending` has not
/// been sent yet.
pub struct ResponseWriter {
    pending: Bytes,
}

impl ResponseWriter {
    pub fn new(response: &Response, include_body: bool) -> Self {
        Self {
            pending: serialize_response(response, include_body),
        }
    }

    pub async fn write_to_stream<W: AsyncWrite + Unpin>(
        &mut self,
        stream: &mut W,
    ) -> anyhow::Result<()> {
        stream.write_all_buf(&mut self.pending).await?;
        stream.flush().await?;
        Ok(())
    }
}
