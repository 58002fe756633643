//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use std::string::FromUtf8Error;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Only `InvalidConfig` ever reaches callers of the public `Cache` handle;
/// the other variants describe store-level outcomes that the handle turns
/// into misses.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Stored payload could not be decoded and was dropped
    #[error("Corrupted entry for key {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: CodecError,
    },
}

// == Codec Error Enum ==
/// Failures of the compression codec or of a value's byte encoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// RLE input ended in the middle of a (count, value) pair
    #[error("Truncated RLE input: {len} bytes is not a whole number of pairs")]
    TruncatedInput { len: usize },

    /// RLE pair with a zero count, which the encoder never emits
    #[error("Zero run length at offset {offset}")]
    ZeroRunLength { offset: usize },

    /// Value could not be turned into bytes
    #[error("Failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),

    /// Bytes could not be turned back into a value
    #[error("Failed to decode value: {0}")]
    Decode(#[source] serde_json::Error),

    /// Decoded bytes are not valid UTF-8 text
    #[error("Decoded text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
