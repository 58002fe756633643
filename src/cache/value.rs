//! Cache Value Module
//!
//! Binds each storable type to a size estimate and a byte encoding.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::size::{estimate_binary, estimate_serialized, estimate_text};
use crate::error::CodecError;

// == Cache Value ==
/// A value the cache can store, measure and compress.
pub trait CacheValue: Clone + Send + Sync + 'static {
    /// Approximate byte cost of the value in its uncompressed form.
    fn estimate_size(&self) -> u64;

    /// Byte form fed to the compression codec.
    fn to_bytes(&self) -> Result<Vec<u8>, CodecError>;

    /// Rebuilds a value from bytes produced by [`CacheValue::to_bytes`].
    fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError>;
}

impl CacheValue for String {
    fn estimate_size(&self) -> u64 {
        estimate_text(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.as_bytes().to_vec())
    }

    fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        Ok(String::from_utf8(bytes)?)
    }
}

impl CacheValue for Vec<u8> {
    fn estimate_size(&self) -> u64 {
        estimate_binary(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.clone())
    }

    fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        Ok(bytes)
    }
}

impl CacheValue for serde_json::Value {
    fn estimate_size(&self) -> u64 {
        estimate_serialized(self)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }

    fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        serde_json::from_slice(&bytes).map_err(CodecError::Decode)
    }
}

// == Json Wrapper ==
/// Stores any serde type by way of its JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> CacheValue for Json<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn estimate_size(&self) -> u64 {
        estimate_serialized(&self.0)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(&self.0).map_err(CodecError::Encode)
    }

    fn from_bytes(bytes: Vec<u8>) -> Result<Self, CodecError> {
        serde_json::from_slice(&bytes)
            .map(Json)
            .map_err(CodecError::Decode)
    }
}
