/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate an unguessable opaque token, hex encoded.
///
/// Bytes come from the operating system CSPRNG; 32 bytes give 256 bits of
/// entropy, which is what table session identifiers rely on.
pub fn random_token(bytes: usize) -> String {
    use rand::RngCore;
    let mut buf = vec![0u8; bytes];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_length_and_charset() {
        let token = random_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_token_is_unique() {
        let a = random_token(32);
        let b = random_token(32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2024-01-01 in milliseconds
        assert!(now_millis() > 1_704_067_200_000);
    }
}
