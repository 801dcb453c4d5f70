use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::http::mime::{self, MediaType};
use crate::http::request::Method;

/// Status code of a response that never declares one.
pub const DEFAULT_STATUS: u32 = 200;

/// A mock route: requests with `method` whose path fully matches `path` are
/// answered with `response`.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub method: Method,
    pub path: PathPattern,
    pub response: MockResponse,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.path, self.response)
    }
}

/// Regular expression a request path must match in full.
///
/// The expression is only compiled the first time it is matched against; a
/// pattern that does not compile surfaces as an error at that point.
pub struct PathPattern {
    source: String,
    compiled: OnceCell<Result<Regex, regex::Error>>,
}

impl PathPattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression, anchored at both ends.
    pub fn regex(&self) -> Result<&Regex, regex::Error> {
        self.compiled
            .get_or_init(|| Regex::new(&format!("^(?:{})$", self.source)))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether the whole of `path` matches; prefixes never count.
    pub fn is_full_match(&self, path: &str) -> Result<bool, regex::Error> {
        Ok(self.regex()?.is_match(path))
    }
}

impl Clone for PathPattern {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            compiled: self.compiled.clone(),
        }
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Status, headers and body declared for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub headers: Vec<(String, String)>,
    /// As declared; only codes that fit HTTP can actually be served.
    pub status: u32,
    pub body: Body,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            status: DEFAULT_STATUS,
            body: Body::text(""),
        }
    }
}

impl fmt::Display for MockResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.status)?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "] {}", self.body)
    }
}

/// Collects declarations for one route block.
#[derive(Debug, Default)]
pub struct MockResponseBuilder {
    response: MockResponse,
}

impl MockResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header; duplicates are kept.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.response.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&mut self, status: u32) -> &mut Self {
        self.response.status = status;
        self
    }

    pub fn body(&mut self, body: Body) -> &mut Self {
        self.response.body = body;
        self
    }

    pub fn build(self) -> MockResponse {
        self.response
    }
}

/// Length and media type attached to a body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyMeta {
    pub content_length: Option<u64>,
    pub content_type: Option<MediaType>,
}

/// Response payload.
///
/// Text is owned by each body; file paths and stream sources are shared
/// between a body and the copies made from it by [`Body::with_overrides`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text { text: String, meta: BodyMeta },
    File { path: Arc<PathBuf>, meta: BodyMeta },
    Stream { source: Arc<StreamSource>, meta: BodyMeta },
}

impl Body {
    pub fn text(text: impl Into<String>) -> Self {
        Body::Text {
            text: text.into(),
            meta: BodyMeta::default(),
        }
    }

    /// A file served from disk at request time.
    ///
    /// Length defaults to the file's current size and media type to a guess
    /// from its extension. A file that cannot be inspected now is not an
    /// error; it is reported when the body is served.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let meta = BodyMeta {
            content_length: std::fs::metadata(&path).ok().map(|m| m.len()),
            content_type: Some(mime::guess_from_path(&path)),
        };
        Body::File {
            path: Arc::new(path),
            meta,
        }
    }

    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Body::Stream {
            source: Arc::new(StreamSource::new(reader)),
            meta: BodyMeta::default(),
        }
    }

    pub fn meta(&self) -> &BodyMeta {
        match self {
            Body::Text { meta, .. } | Body::File { meta, .. } | Body::Stream { meta, .. } => meta,
        }
    }

    pub fn content_length(&self) -> Option<u64> {
        self.meta().content_length
    }

    pub fn content_type(&self) -> Option<&MediaType> {
        self.meta().content_type.as_ref()
    }

    /// Same payload with `content_length` / `content_type` replaced where
    /// given; unset arguments keep the current value.
    pub fn with_overrides(
        &self,
        content_length: Option<u64>,
        content_type: Option<MediaType>,
    ) -> Body {
        let meta = BodyMeta {
            content_length: content_length.or(self.meta().content_length),
            content_type: content_type.or_else(|| self.meta().content_type.clone()),
        };

        match self {
            Body::Text { text, .. } => Body::Text {
                text: text.clone(),
                meta,
            },
            Body::File { path, .. } => Body::File {
                path: Arc::clone(path),
                meta,
            },
            Body::Stream { source, .. } => Body::Stream {
                source: Arc::clone(source),
                meta,
            },
        }
    }

    /// Reads the full payload.
    ///
    /// File bodies hit the disk on every call; stream bodies are read once
    /// and the bytes reused afterwards.
    pub async fn payload(&self) -> std::io::Result<Bytes> {
        match self {
            Body::Text { text, .. } => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Body::File { path, .. } => tokio::fs::read(path.as_path()).await.map(Bytes::from),
            Body::Stream { source, .. } => {
                let source = Arc::clone(source);
                tokio::task::spawn_blocking(move || source.bytes())
                    .await
                    .map_err(std::io::Error::other)?
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Body::File { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text { text, .. } => write!(f, "text({:?})", text)?,
            Body::File { path, .. } => write!(f, "file({})", path.display())?,
            Body::Stream { .. } => f.write_str("stream")?,
        }
        let meta = self.meta();
        if let Some(length) = meta.content_length {
            write!(f, " length={}", length)?;
        }
        if let Some(content_type) = &meta.content_type {
            write!(f, " type={}", content_type)?;
        }
        Ok(())
    }
}

/// A one-shot byte source whose contents are buffered on first read.
pub struct StreamSource {
    reader: Mutex<Option<Box<dyn Read + Send>>>,
    data: OnceCell<Bytes>,
}

impl StreamSource {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Mutex::new(Some(Box::new(reader))),
            data: OnceCell::new(),
        }
    }

    /// The whole stream, read to the end the first time this is called.
    pub fn bytes(&self) -> std::io::Result<Bytes> {
        self.data
            .get_or_try_init(|| {
                let mut reader = self
                    .reader
                    .lock()
                    .map_err(|_| std::io::Error::other("stream reader lock poisoned"))?
                    .take()
                    .ok_or_else(|| std::io::Error::other("stream already consumed"))?;

                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok::<_, std::io::Error>(Bytes::from(buf))
            })
            .cloned()
    }
}

impl PartialEq for StreamSource {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("buffered", &self.data.get().map(Bytes::len))
            .finish()
    }
}
