//! Content digests rendered as lower-case hex.
//!
//! Used by `file_hash` body declarations, which replace a response body with
//! the digest of a file computed while the route document is parsed. Not meant
//! for anything security sensitive.

use std::io::{ErrorKind, Read};
use std::str::FromStr;

use md5::Md5;
use md2::Md2;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

/// Chunk size used when reading streams and block sources.
pub const CHUNK_SIZE: usize = 8192;

/// Narrowest rendering of any digest, in hex characters.
const MIN_HEX_WIDTH: usize = 32;

/// Zero-length reads a stream may return in a row before it counts as drained.
const MAX_EMPTY_READS: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("failed to read digest input: {0}")]
    Io(#[from] std::io::Error),
}

/// Digest algorithms recognised by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md2,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl FromStr for Algorithm {
    type Err = HashError;

    /// Accepts the usual provider spellings, case-insensitively:
    /// `MD5`, `SHA-1`, `SHA1`, `SHA`, `sha-256`, `SHA-512/256`, ...
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "MD2" => Ok(Algorithm::Md2),
            "MD5" => Ok(Algorithm::Md5),
            "SHA" | "SHA1" => Ok(Algorithm::Sha1),
            "SHA224" => Ok(Algorithm::Sha224),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA384" => Ok(Algorithm::Sha384),
            "SHA512" => Ok(Algorithm::Sha512),
            "SHA512/224" => Ok(Algorithm::Sha512_224),
            "SHA512/256" => Ok(Algorithm::Sha512_256),
            _ => Err(HashError::UnsupportedAlgorithm(name.to_string())),
        }
    }
}

impl Algorithm {
    pub fn hasher(self) -> Hasher {
        match self {
            Algorithm::Md2 => Hasher::Md2(Md2::new()),
            Algorithm::Md5 => Hasher::Md5(Md5::new()),
            Algorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            Algorithm::Sha224 => Hasher::Sha224(Sha224::new()),
            Algorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            Algorithm::Sha384 => Hasher::Sha384(Sha384::new()),
            Algorithm::Sha512 => Hasher::Sha512(Sha512::new()),
            Algorithm::Sha512_224 => Hasher::Sha512_224(Sha512_224::new()),
            Algorithm::Sha512_256 => Hasher::Sha512_256(Sha512_256::new()),
        }
    }
}

/// Running digest state for one of the supported algorithms.
pub enum Hasher {
    Md2(Md2),
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Sha512_224(Sha512_224),
    Sha512_256(Sha512_256),
}

impl Hasher {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Md2(h) => h.update(data),
            Hasher::Md5(h) => h.update(data),
            Hasher::Sha1(h) => h.update(data),
            Hasher::Sha224(h) => h.update(data),
            Hasher::Sha256(h) => h.update(data),
            Hasher::Sha384(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
            Hasher::Sha512_224(h) => h.update(data),
            Hasher::Sha512_256(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            Hasher::Md2(h) => h.finalize().to_vec(),
            Hasher::Md5(h) => h.finalize().to_vec(),
            Hasher::Sha1(h) => h.finalize().to_vec(),
            Hasher::Sha224(h) => h.finalize().to_vec(),
            Hasher::Sha256(h) => h.finalize().to_vec(),
            Hasher::Sha384(h) => h.finalize().to_vec(),
            Hasher::Sha512(h) => h.finalize().to_vec(),
            Hasher::Sha512_224(h) => h.finalize().to_vec(),
            Hasher::Sha512_256(h) => h.finalize().to_vec(),
        }
    }

    pub fn finalize_hex(self) -> String {
        to_hex(&self.finalize())
    }
}

/// Renders a digest as lower-case hex, at least 32 characters wide.
pub fn to_hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(MIN_HEX_WIDTH.max(digest.len() * 2));
    for _ in (digest.len() * 2)..MIN_HEX_WIDTH {
        out.push('0');
    }
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Hashes an in-memory buffer.
///
/// # Example
///
/// ```
/// # use mimic::hash::hash_bytes;
/// assert_eq!(
///     hash_bytes(b"", "MD5").unwrap(),
///     "d41d8cd98f00b204e9800998ecf8427e"
/// );
/// ```
pub fn hash_bytes(data: &[u8], algorithm: &str) -> Result<String, HashError> {
    let mut hasher = algorithm.parse::<Algorithm>()?.hasher();
    hasher.update(data);
    Ok(hasher.finalize_hex())
}

/// Hashes a pull-based stream read to exhaustion.
///
/// Up to three zero-length reads in a row are tolerated; the fourth ends
/// the stream.
pub fn hash_stream<R: Read>(mut stream: R, algorithm: &str) -> Result<String, HashError> {
    let mut hasher = algorithm.parse::<Algorithm>()?.hasher();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut empty_reads = 0u8;

    loop {
        let n = match stream.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            empty_reads += 1;
            if empty_reads > MAX_EMPTY_READS {
                break;
            }
            continue;
        }

        empty_reads = 0;
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize_hex())
}

/// Hashes a block source in fixed 8 KiB chunks, stopping at the first empty
/// read.
pub fn hash_blocks<R: Read>(mut source: R, algorithm: &str) -> Result<String, HashError> {
    let mut hasher = algorithm.parse::<Algorithm>()?.hasher();
    let mut block = [0u8; CHUNK_SIZE];

    loop {
        let n = match source.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&block[..n]);
    }

    Ok(hasher.finalize_hex())
}

/// Hashes the contents of a file on disk.
pub fn hash_file(path: impl AsRef<std::path::Path>, algorithm: &str) -> Result<String, HashError> {
    // Resolve the algorithm before touching the filesystem.
    algorithm.parse::<Algorithm>()?;
    let file = std::fs::File::open(path)?;
    hash_blocks(file, algorithm)
}
