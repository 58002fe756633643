//! Size Estimator Module
//!
//! Approximate byte cost of stored values. Estimates only need to be
//! consistent (larger values weigh more), not exact.

use serde::Serialize;
use tracing::debug;

/// Fallback cost for values that cannot be measured.
pub const DEFAULT_SIZE_ESTIMATE: u64 = 1024;

// == Text ==
/// Two bytes per UTF-16 code unit.
pub fn estimate_text(text: &str) -> u64 {
    text.encode_utf16().count() as u64 * 2
}

// == Binary ==
/// Exact byte length.
pub fn estimate_binary(bytes: &[u8]) -> u64 {
    bytes.len() as u64
}

// == Serialized ==
/// Measures the JSON text form of a value as text.
///
/// Falls back to [`DEFAULT_SIZE_ESTIMATE`] when serialization fails.
pub fn estimate_serialized<T: Serialize + ?Sized>(value: &T) -> u64 {
    match serde_json::to_string(value) {
        Ok(json) => estimate_text(&json),
        Err(err) => {
            debug!("Size estimate fell back to default: {}", err);
            DEFAULT_SIZE_ESTIMATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_estimate_text_ascii() {
        assert_eq!(estimate_text(""), 0);
        assert_eq!(estimate_text("short"), 10);
    }

    #[test]
    fn test_estimate_text_counts_utf16_units() {
        // 'é' is one code unit, the emoji is a surrogate pair
        assert_eq!(estimate_text("é"), 2);
        assert_eq!(estimate_text("🦀"), 4);
    }

    #[test]
    fn test_estimate_binary() {
        assert_eq!(estimate_binary(&[]), 0);
        assert_eq!(estimate_binary(&[1, 2, 3]), 3);
    }

    #[test]
    fn test_estimate_serialized() {
        let value = serde_json::json!({"a": 1});
        // {"a":1} is 7 characters
        assert_eq!(estimate_serialized(&value), 14);
        assert_eq!(estimate_serialized(&vec![1, 2, 3]), 14);
    }

    #[test]
    fn test_estimate_serialized_fallback() {
        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "x");
        assert_eq!(estimate_serialized(&map), DEFAULT_SIZE_ESTIMATE);
    }

    #[test]
    fn test_estimates_are_monotonic() {
        let small = "a".repeat(10);
        let large = "a".repeat(11);
        assert!(estimate_text(&large) > estimate_text(&small));
    }
}
