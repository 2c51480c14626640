//! Content hashing and the two wire encodings of a 32-byte hash.
//!
//! A deployed registry may declare its hash parameter as `bytes32`, `bytes`
//! or `string`. [`EncodedHash`] keeps one digest and renders it either as a
//! raw byte vector or as a `0x` hex string, so the submission pipeline can
//! try both against whatever the contract actually takes.

use crate::error::{RegistryError, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{hex, keccak256, Bytes, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Length of a digest in hex digits, not counting the `0x` prefix.
const DIGEST_HEX_LEN: usize = 64;

/// Deterministic keccak-256 digest of arbitrary content.
pub fn content_hash(content: impl AsRef<[u8]>) -> B256 {
    keccak256(content)
}

/// One resolved digest with both candidate wire representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHash {
    pub digest: B256,
    pub bytes: Bytes,
    pub as_string: String,
    /// True when the digest was derived by hashing the input text.
    pub derived: bool,
}

/// Which of the two representations goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashEncoding {
    ByteVector,
    HexString,
}

impl fmt::Display for HashEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashEncoding::ByteVector => write!(f, "byte-vector"),
            HashEncoding::HexString => write!(f, "hex-string"),
        }
    }
}

impl EncodedHash {
    fn from_digest(digest: B256, derived: bool) -> Self {
        Self {
            digest,
            bytes: Bytes::copy_from_slice(digest.as_slice()),
            as_string: hex::encode_prefixed(digest),
            derived,
        }
    }

    /// Build the ABI value for a parameter of type `ty` using `encoding`.
    ///
    /// The byte vector only fits `bytes32` and `bytes`. The hex string is
    /// coerced into the parameter type, so a `string` parameter receives the
    /// text and a `bytes32` parameter receives the same digest back.
    pub fn value_for(&self, encoding: HashEncoding, ty: &DynSolType) -> Result<DynSolValue> {
        match encoding {
            HashEncoding::ByteVector => match ty {
                DynSolType::FixedBytes(32) => Ok(DynSolValue::FixedBytes(self.digest, 32)),
                DynSolType::Bytes => Ok(DynSolValue::Bytes(self.bytes.to_vec())),
                other => Err(RegistryError::Abi(format!(
                    "a byte vector cannot be passed as {other}"
                ))),
            },
            HashEncoding::HexString => Ok(ty.coerce_str(&self.as_string)?),
        }
    }
}

/// Resolve a caller supplied hash into both wire encodings.
pub fn encode(raw: &Value) -> Result<EncodedHash> {
    match raw {
        Value::String(s) => encode_str(s),
        other => Err(RegistryError::InvalidInput(format!(
            "hash must be a string, got {other}"
        ))),
    }
}

/// Resolve a hash string.
///
/// `0x` (or `0X`) followed by exactly 64 hex digits is taken as the digest
/// itself. Any other prefixed hex run is a malformed digest. Everything else
/// is hashed as text.
pub fn encode_str(raw: &str) -> Result<EncodedHash> {
    if let Some(body) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        let all_hex = body.chars().all(|c| c.is_ascii_hexdigit());
        if all_hex || body.len() == DIGEST_HEX_LEN {
            if body.len() != DIGEST_HEX_LEN {
                return Err(RegistryError::InvalidHash(format!(
                    "expected {DIGEST_HEX_LEN} hex digits after 0x, got {}",
                    body.len()
                )));
            }
            let digest = body
                .parse::<B256>()
                .map_err(|e| RegistryError::InvalidHash(format!("{raw:?}: {e}")))?;
            return Ok(EncodedHash::from_digest(digest, false));
        }
    }

    Ok(EncodedHash::from_digest(content_hash(raw.as_bytes()), true))
}

/// Render a hash read back from the contract: bytes as `0x` hex, strings
/// verbatim.
pub fn hash_from_value(value: &DynSolValue) -> Option<String> {
    match value {
        DynSolValue::FixedBytes(word, size) => Some(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Bytes(bytes) => Some(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Some(s.clone()),
        _ => None,
    }
}
