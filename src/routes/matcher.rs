//! Route selection and response assembly.

use crate::http::mime::{MediaType, MediaTypeError};
use crate::http::request::Method;
use crate::routes::model::{Body, Route};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("route pattern `{pattern}` is not a valid regular expression")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Content-Type `{value}` is not a valid media type")]
    InvalidContentType {
        value: String,
        #[source]
        source: MediaTypeError,
    },
}

/// Final status, headers and body for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

/// First route, in declaration order, whose method equals `method` and whose
/// pattern matches all of `path`.
pub fn find<'a>(
    routes: &'a [Route],
    method: Method,
    path: &str,
) -> Result<Option<&'a Route>, DispatchError> {
    for route in routes.iter().filter(|r| r.method == method) {
        let matched = route
            .path
            .is_full_match(path)
            .map_err(|source| DispatchError::InvalidPattern {
                pattern: route.path.as_str().to_string(),
                source,
            })?;

        if matched {
            return Ok(Some(route));
        }
    }
    Ok(None)
}

/// Builds the outgoing response for `route`.
///
/// The first `Content-Length` and first `Content-Type` header (any case) are
/// taken out of the header list and applied to the body instead. A length
/// that is not a number is ignored.
pub fn assemble(route: &Route) -> Result<Assembled, DispatchError> {
    let mut headers = route.response.headers.clone();

    let content_length = take_header(&mut headers, "Content-Length");
    let content_type = take_header(&mut headers, "Content-Type");

    let body = if content_length.is_some() || content_type.is_some() {
        let length = content_length.and_then(|v| v.trim().parse::<u64>().ok());
        let media_type = content_type
            .map(|value| {
                MediaType::parse(&value)
                    .map_err(|source| DispatchError::InvalidContentType { value, source })
            })
            .transpose()?;

        route.response.body.with_overrides(length, media_type)
    } else {
        route.response.body.clone()
    };

    Ok(Assembled {
        status: route.response.status,
        headers,
        body,
    })
}

fn take_header(headers: &mut Vec<(String, String)>, name: &str) -> Option<String> {
    let index = headers
        .iter()
        .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
    Some(headers.remove(index).1)
}
