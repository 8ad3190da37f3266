//! Access-key verification and attachment id derivation
//!
//! Write endpoints are protected by a single shared access key. The server
//! never stores the key itself, only its SHA-256 digest (lowercase hex) in
//! the bootstrap config under `access_key_sha256`.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex SHA-256 of the key's UTF-8 bytes
///
/// # Examples
///
/// ```
/// use quoter_common::api::auth::hash_access_key;
///
/// assert_eq!(
///     hash_access_key("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
pub fn hash_access_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Check a presented key against the configured digest
///
/// Returns `false` when no digest is configured: without a digest the
/// write API is closed.
pub fn verify_access_key(key: &str, expected_sha256: Option<&str>) -> bool {
    let Some(expected) = expected_sha256 else {
        return false;
    };

    let calculated = hash_access_key(key);
    let expected = expected.trim().to_ascii_lowercase();

    if calculated.len() != expected.len() {
        return false;
    }

    // Compare every byte regardless of where the first mismatch is
    calculated
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Derive the storage id of an uploaded attachment
///
/// HMAC-SHA256 over `data`, keyed by the decimal upload time in
/// milliseconds, hex encoded.
pub fn attachment_id(data: &[u8], salt_millis: i64) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(salt_millis.to_string().as_bytes())
        .map_err(|e| Error::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}
