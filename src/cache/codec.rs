//! Compression Codec Module
//!
//! Run-length encoding of value bytes. Each maximal run of one byte value,
//! capped at 255, becomes a `(count, value)` pair.

use crate::cache::value::CacheValue;
use crate::error::CodecError;

/// Values whose estimated size exceeds this are candidates for compression.
pub const COMPRESSION_THRESHOLD_BYTES: u64 = 1024;

const MAX_RUN: usize = u8::MAX as usize;

// == Should Compress ==
/// Compression is attempted only when enabled and above the threshold.
pub fn should_compress(compression_enabled: bool, raw_size: u64) -> bool {
    compression_enabled && raw_size > COMPRESSION_THRESHOLD_BYTES
}

// == RLE Encode ==
/// Encodes `data` as `(count, value)` pairs.
///
/// Incompressible input at worst doubles in size.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().min(1024));
    let mut i = 0;

    while i < data.len() {
        let current = data[i];
        let mut count = 1;
        while i + count < data.len() && data[i + count] == current && count < MAX_RUN {
            count += 1;
        }
        out.push(count as u8);
        out.push(current);
        i += count;
    }

    out
}

// == RLE Decode ==
/// Expands `(count, value)` pairs back into the original bytes.
pub fn rle_decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.len() % 2 != 0 {
        return Err(CodecError::TruncatedInput { len: data.len() });
    }

    let expanded: usize = data.chunks_exact(2).map(|pair| pair[0] as usize).sum();
    let mut out = Vec::with_capacity(expanded);

    for (index, pair) in data.chunks_exact(2).enumerate() {
        let (count, value) = (pair[0], pair[1]);
        if count == 0 {
            return Err(CodecError::ZeroRunLength { offset: index * 2 });
        }
        out.resize(out.len() + count as usize, value);
    }

    Ok(out)
}

// == Compress ==
/// Turns a value into its compressed stored form.
pub fn compress<V: CacheValue>(value: &V) -> Result<Vec<u8>, CodecError> {
    let bytes = value.to_bytes()?;
    Ok(rle_encode(&bytes))
}

// == Decompress ==
/// Rebuilds a value from its compressed stored form.
pub fn decompress<V: CacheValue>(stored: &[u8]) -> Result<V, CodecError> {
    let bytes = rle_decode(stored)?;
    V::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_compress() {
        assert!(!should_compress(false, 10_000));
        assert!(!should_compress(true, COMPRESSION_THRESHOLD_BYTES));
        assert!(should_compress(true, COMPRESSION_THRESHOLD_BYTES + 1));
    }

    #[test]
    fn test_encode_empty() {
        assert!(rle_encode(&[]).is_empty());
        assert!(rle_decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_encode_single_byte() {
        assert_eq!(rle_encode(&[7]), vec![1, 7]);
    }

    #[test]
    fn test_encode_runs() {
        assert_eq!(rle_encode(b"aaabcc"), vec![3, b'a', 1, b'b', 2, b'c']);
    }

    #[test]
    fn test_encode_caps_runs_at_255() {
        let data = vec![9u8; 600];
        let encoded = rle_encode(&data);
        assert_eq!(encoded, vec![255, 9, 255, 9, 90, 9]);
        assert_eq!(rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_encode_incompressible_doubles() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(rle_encode(&data).len(), data.len() * 2);
    }

    #[test]
    fn test_decode_truncated() {
        let result = rle_decode(&[3, b'a', 2]);
        assert!(matches!(result, Err(CodecError::TruncatedInput { len: 3 })));
    }

    #[test]
    fn test_decode_zero_run() {
        let result = rle_decode(&[1, b'a', 0, b'b']);
        assert!(matches!(result, Err(CodecError::ZeroRunLength { offset: 2 })));
    }

    #[test]
    fn test_compress_string_roundtrip() {
        let value = "ab".repeat(10) + &"z".repeat(2000);
        let stored = compress(&value).unwrap();
        assert!(stored.len() < value.len());
        let restored: String = decompress(&stored).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn test_decompress_invalid_text() {
        // decodes to a lone continuation byte
        let result = decompress::<String>(&[1, 0x80]);
        assert!(matches!(result, Err(CodecError::InvalidUtf8(_))));
    }
}
