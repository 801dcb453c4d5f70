//! Media types: parsing `Content-Type` values and guessing them from file
//! extensions.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaTypeError {
    #[error("media type is empty")]
    Empty,
    #[error("media type `{0}` is missing a `/` separator")]
    MissingSubtype(String),
    #[error("media type `{0}` has an invalid token")]
    InvalidToken(String),
    #[error("media type parameter `{0}` is malformed")]
    InvalidParameter(String),
}

/// A parsed media type such as `text/html; charset=utf-8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub kind: String,
    pub subtype: String,
    pub params: Vec<(String, String)>,
}

impl MediaType {
    pub fn new(kind: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            subtype: subtype.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Parses a `Content-Type` header value.
    ///
    /// # Example
    ///
    /// ```
    /// # use mimic::http::mime::MediaType;
    /// let mt = MediaType::parse("text/plain; charset=utf-8").unwrap();
    /// assert_eq!(mt.essence(), "text/plain");
    /// assert_eq!(mt.param("charset"), Some("utf-8"));
    /// ```
    pub fn parse(value: &str) -> Result<Self, MediaTypeError> {
        let mut parts = value.split(';');
        let essence = parts.next().unwrap_or("").trim();

        if essence.is_empty() {
            return Err(MediaTypeError::Empty);
        }

        let (kind, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MediaTypeError::MissingSubtype(essence.to_string()))?;
        let (kind, subtype) = (kind.trim(), subtype.trim());

        if !is_token(kind) || !is_token(subtype) {
            return Err(MediaTypeError::InvalidToken(essence.to_string()));
        }

        let mut media_type = MediaType::new(kind, subtype);

        for raw in parts {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| MediaTypeError::InvalidParameter(raw.to_string()))?;
            let key = key.trim();
            let value = unquote(value.trim())
                .ok_or_else(|| MediaTypeError::InvalidParameter(raw.to_string()))?;

            if !is_token(key) {
                return Err(MediaTypeError::InvalidParameter(raw.to_string()));
            }

            media_type.params.push((key.to_string(), value));
        }

        Ok(media_type)
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (key, value) in &self.params {
            if is_token(value) {
                write!(f, "; {}={}", key, value)?;
            } else {
                write!(f, "; {}=\"{}\"", key, value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
        })
}

fn unquote(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return is_token(value).then(|| value.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Guesses a media type from a file's extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn guess_from_path(path: &Path) -> MediaType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let (kind, subtype, text) = match ext.as_str() {
        "html" | "htm" => ("text", "html", true),
        "css" => ("text", "css", true),
        "js" | "mjs" => ("application", "javascript", true),
        "json" => ("application", "json", false),
        "txt" | "log" => ("text", "plain", true),
        "csv" => ("text", "csv", true),
        "md" => ("text", "markdown", true),
        "xml" => ("text", "xml", true),
        "yaml" | "yml" => ("application", "yaml", false),
        "png" => ("image", "png", false),
        "jpg" | "jpeg" => ("image", "jpeg", false),
        "gif" => ("image", "gif", false),
        "svg" => ("image", "svg+xml", false),
        "ico" => ("image", "x-icon", false),
        "webp" => ("image", "webp", false),
        "pdf" => ("application", "pdf", false),
        "zip" => ("application", "zip", false),
        "gz" => ("application", "gzip", false),
        "wasm" => ("application", "wasm", false),
        "woff" => ("font", "woff", false),
        "woff2" => ("font", "woff2", false),
        "mp3" => ("audio", "mpeg", false),
        "mp4" => ("video", "mp4", false),
        _ => ("application", "octet-stream", false),
    };

    let media_type = MediaType::new(kind, subtype);
    if text {
        media_type.with_param("charset", "UTF-8")
    } else {
        media_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_essence() {
        let mt = MediaType::parse("application/json").unwrap();
        assert_eq!(mt, MediaType::new("application", "json"));
    }

    #[test]
    fn parses_quoted_parameter() {
        let mt = MediaType::parse("multipart/form-data; boundary=\"a b\"").unwrap();
        assert_eq!(mt.param("boundary"), Some("a b"));
        assert_eq!(mt.to_string(), "multipart/form-data; boundary=\"a b\"");
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(MediaType::parse("  "), Err(MediaTypeError::Empty));
        assert!(matches!(
            MediaType::parse("text"),
            Err(MediaTypeError::MissingSubtype(_))
        ));
        assert!(matches!(
            MediaType::parse("text/plain; charset"),
            Err(MediaTypeError::InvalidParameter(_))
        ));
        assert!(matches!(
            MediaType::parse("te xt/plain"),
            Err(MediaTypeError::InvalidToken(_))
        ));
    }

    #[test]
    fn guesses_by_extension() {
        assert_eq!(
            guess_from_path(Path::new("index.HTML")).to_string(),
            "text/html; charset=UTF-8"
        );
        assert_eq!(guess_from_path(Path::new("logo.png")).essence(), "image/png");
        assert_eq!(
            guess_from_path(Path::new("blob")).essence(),
            "application/octet-stream"
        );
    }
}
