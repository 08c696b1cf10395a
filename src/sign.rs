//! Signing and verification of stored user records.
//!
//! A record written to the session store is accompanied by a verification
//! digest: the lowercase-hex HMAC-SHA256 over its canonical serialization,
//! keyed with the configured secret. Any mutation of the stored record that
//! does not re-sign it makes the digest mismatch on the next read.
//!
//! # Security Properties
//!
//! - **Zeroize on drop**: the [`Secret`] key is securely cleared from memory
//! - **Constant-time verification**: digest comparison goes through
//!   `Mac::verify_slice` rather than string equality
//! - Rotating the secret invalidates every previously signed session

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::ConfigError;

pub type HmacSha256 = Hmac<Sha256>;

/// Secret HMAC key, supplied at construction.
///
/// Must remain constant for the lifetime of valid sessions. Automatically
/// zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap the key bytes, rejecting an empty key.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Get the key bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Compute the verification digest for `payload`: HMAC-SHA256 keyed with
/// `secret`, encoded as lowercase hex.
#[must_use]
pub fn sign(secret: &Secret, payload: &[u8]) -> String {
    // HMAC accepts keys of any length, so construction cannot fail
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify `digest_hex` against the digest recomputed over `payload`.
///
/// The comparison is constant-time. A malformed digest (bad hex, wrong
/// length) is simply a failed verification, not an error.
#[must_use]
pub fn verify(secret: &Secret, payload: &[u8], digest_hex: &str) -> bool {
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
