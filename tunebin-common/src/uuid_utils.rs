//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

/// Short random fragment, first 8 hex digits of a fresh UUIDv4
pub fn short_fragment() -> String {
    generate().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let id = generate();
        assert_eq!(parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_short_fragment_is_hex() {
        let fragment = short_fragment();
        assert_eq!(fragment.len(), 8);
        assert!(fragment.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
