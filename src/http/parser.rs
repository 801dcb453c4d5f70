//! HTTP/1.1 request framing.

use std::collections::HashMap;

use crate::http::request::{Method, Request};

/// Largest request head we buffer before giving up on a client.
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line or head")]
    InvalidRequest,
    #[error("unsupported request method")]
    InvalidMethod,
    #[error("header line without a colon")]
    InvalidHeader,
    #[error("Content-Length is not a number")]
    InvalidContentLength,
    #[error("request head exceeds {MAX_HEAD_SIZE} bytes")]
    HeadTooLarge,
    /// More bytes are needed before a full request is available.
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`, returning it and the number of
/// bytes it occupied.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let head_len = match find_head_end(buf) {
        Some(len) => len,
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadTooLarge),
        None => return Err(ParseError::Incomplete),
    };

    let head = std::str::from_utf8(&buf[..head_len]).map_err(|_| ParseError::InvalidRequest)?;
    let mut lines = head.split("\r\n");

    let (method, path, version) = parse_request_line(lines.next().unwrap_or(""))?;

    let mut headers = HashMap::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = parse_header_line(line)?;
        headers.insert(name.to_string(), value.to_string());
    }

    let body_start = head_len + HEAD_TERMINATOR.len();
    let body_len = declared_length(&headers)?;
    let body = buf
        .get(body_start..body_start + body_len)
        .ok_or(ParseError::Incomplete)?
        .to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };
    Ok((request, body_start + body_len))
}

fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(path), Some(version)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::InvalidRequest);
    };

    let method = Method::from_str(method).ok_or(ParseError::InvalidMethod)?;
    Ok((method, path, version))
}

fn parse_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    line.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .ok_or(ParseError::InvalidHeader)
}

fn declared_length(headers: &HashMap<String, String>) -> Result<usize, ParseError> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .map_or(Ok(0), |(_, value)| {
            value.parse().map_err(|_| ParseError::InvalidContentLength)
        })
}

/// Length of the head, excluding the blank line that ends it.
fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len()).position(|w| w == HEAD_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn short_request_line_is_invalid() {
        let req = b"GET /\r\n\r\n";
        assert_eq!(parse_http_request(req).unwrap_err(), ParseError::InvalidRequest);
    }

    #[test]
    fn oversized_head_is_rejected() {
        let mut req = b"GET / HTTP/1.1\r\nX-Pad: ".to_vec();
        req.extend(std::iter::repeat_n(b'a', MAX_HEAD_SIZE));

        assert_eq!(parse_http_request(&req).unwrap_err(), ParseError::HeadTooLarge);
    }
}
