//! Address validation.
//!
//! An address string is accepted when it has the canonical `0x` + 40 hex
//! digit shape. Single-case bodies carry no checksum; mixed-case bodies must
//! satisfy EIP-55.

use crate::error::{RegistryError, Result};
use alloy_primitives::Address;
use regex::Regex;
use std::sync::OnceLock;

fn address_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new("^0x[0-9a-fA-F]{40}$").expect("static regex"))
}

/// Canonical function to determine if an address string is well formed.
pub fn valid_address(candidate: &str) -> bool {
    if !address_shape().is_match(candidate) {
        return false;
    }
    let body = &candidate[2..];
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(candidate, None).is_ok();
    }
    true
}

/// Validate and parse an address string.
pub fn parse_address(candidate: &str) -> Result<Address> {
    let trimmed = candidate.trim();
    if !valid_address(trimmed) {
        return Err(RegistryError::InvalidInput(format!(
            "not a valid address: {candidate:?}"
        )));
    }
    trimmed
        .parse::<Address>()
        .map_err(|e| RegistryError::InvalidInput(format!("not a valid address: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_valid_address() {
        assert!(valid_address(CHECKSUMMED));
        assert!(valid_address(&CHECKSUMMED.to_lowercase()));
        assert!(valid_address(&format!("0x{}", CHECKSUMMED[2..].to_uppercase())));
        assert!(valid_address("0x0000000000000000000000000000000000000000"));
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        // flip the case of one letter
        let broken = CHECKSUMMED.replacen("aA", "Aa", 1);
        assert!(!valid_address(&broken));
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let body = &CHECKSUMMED.to_lowercase()[2..];
        for len in [0, 1, 39, 41, 64] {
            let candidate = format!("0x{}", "a".repeat(len));
            assert!(!valid_address(&candidate), "length {len} accepted");
        }
        assert!(!valid_address(body));
        assert!(!valid_address(&format!("0X{body}")));
        assert!(!valid_address(&format!("0x{}g", &body[..39])));
        assert!(!valid_address(&format!(" 0x{body}")));
        assert!(!valid_address("alice.hypr"));
    }

    #[test]
    fn test_parse_address() {
        let parsed = parse_address(&format!("  {CHECKSUMMED} ")).unwrap();
        assert_eq!(parsed.to_checksum(None), CHECKSUMMED);

        let err = parse_address("0x1234").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInput(_)));
    }
}
