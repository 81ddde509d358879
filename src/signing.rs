//! Keyed signing and verification of the cookie payload.
//!
//! HMAC-SHA512 over the UTF-8 bytes of the canonical payload, keyed by the
//! UTF-8 bytes of the pre-shared secret. Digests are embedded in the cookie as
//! standard base64 with padding.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// The process-wide signing secret.
///
/// Supplied once at startup and held read-only for the process lifetime; it is
/// never derived, rotated, or logged. Losing or changing the key invalidates
/// all previously issued cookies.
#[derive(Clone)]
pub struct IdentityKey {
    secret: String,
}

impl IdentityKey {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs a payload, returning the base64-encoded digest.
    pub fn sign(&self, payload: &str) -> String {
        STANDARD.encode(self.mac(payload).finalize().into_bytes())
    }

    /// Checks a claimed base64 signature against the recomputed digest.
    ///
    /// The digest comparison is constant-time (`Mac::verify_slice`); a claimed
    /// value that is not valid base64 can never match and is rejected.
    pub fn verify(&self, payload: &str, claimed: &str) -> bool {
        let Ok(claimed) = STANDARD.decode(claimed) else {
            return false;
        };
        self.mac(payload).verify_slice(&claimed).is_ok()
    }

    fn mac(&self, payload: &str) -> HmacSha512 {
        let mut mac = HmacSha512::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        mac
    }
}

// The secret must never end up in logs.
impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityKey(..)")
    }
}
