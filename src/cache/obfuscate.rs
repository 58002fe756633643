//! Key Obfuscator Module
//!
//! Turns cache keys into short tokens before they leave the engine.
//! This is a 32-bit polynomial hash, not a security control.

/// Hashes a key to a signed base-36 token.
///
/// Each UTF-16 code unit folds in as `hash * 31 + unit` with 32-bit
/// wrapping; negative hashes keep their `-` sign.
pub fn obfuscate_key(key: &str) -> String {
    let hash = key
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });

    to_base36(i64::from(hash))
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key() {
        assert_eq!(obfuscate_key(""), "0");
    }

    #[test]
    fn test_known_values() {
        // 'a' = 97 = 2 * 36 + 25
        assert_eq!(obfuscate_key("a"), "2p");
        // 97 * 31 + 98 = 3105
        assert_eq!(obfuscate_key("ab"), "2e9");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(obfuscate_key("user:42:profile"), obfuscate_key("user:42:profile"));
        assert_ne!(obfuscate_key("user:42"), obfuscate_key("user:43"));
    }

    #[test]
    fn test_does_not_leak_key() {
        let token = obfuscate_key("session-token-secret");
        assert!(!token.contains("secret"));
        assert!(token.len() <= 8);
    }

    #[test]
    fn test_negative_hash_keeps_sign() {
        // long keys overflow 32 bits and can wrap negative
        let token = (0..64)
            .map(|i| obfuscate_key(&format!("key-{}", i)))
            .find(|t| t.starts_with('-'));
        assert!(token.is_some());
    }

    #[test]
    fn test_base36_extremes() {
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(-36), "-10");
        assert_eq!(to_base36(i64::from(i32::MIN)), "-zik0zk");
    }
}
