//! The signed `UserInfo` cookie value and its fixed metadata.

use thiserror::Error;
use time::Duration;
use tower_cookies::Cookie;

use crate::{
    codec::{self, DecodeError},
    principal::SessionPrincipal,
    signing::IdentityKey,
};

/// Fixed name of the session cookie.
pub const COOKIE_NAME: &str = "UserInfo";

const COOKIE_PATH: &str = "/";
const COOKIE_TTL: Duration = Duration::hours(1);

/// Reasons a raw cookie value fails to parse and verify.
///
/// All three are fatal to the request: a cookie that fails any check grants no
/// partial trust. Which variant occurred should reach logs, not clients.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// The cookie carries no `hmac` segment at all.
    #[error("cookie not signed (no hmac)")]
    Unsigned,

    /// The signature is present but does not match the recomputed digest.
    #[error("cookie signature (hmac) invalid")]
    InvalidSignature,

    /// The payload could not be decoded into a principal.
    #[error("cookie payload malformed: {0}")]
    MalformedPayload(#[from] DecodeError),
}

/// A principal together with its canonical payload and signature.
///
/// Created fresh for every cookie write and reconstructed fresh from the raw
/// cookie text on every request; never cached across requests.
#[derive(Debug, Clone)]
pub struct SignedUserCookie {
    principal: SessionPrincipal,
    payload: String,
    hmac: String,
}

impl SignedUserCookie {
    /// Encodes and signs a principal for a cookie write.
    pub fn new(principal: SessionPrincipal, key: &IdentityKey) -> Self {
        let payload = codec::encode_payload(&principal);
        let hmac = key.sign(&payload);
        Self {
            principal,
            payload,
            hmac,
        }
    }

    /// Parses and verifies a raw cookie value, failing closed.
    ///
    /// The signature is recomputed over the payload re-encoded from the parsed
    /// fields, through the same code path used when issuing the cookie.
    /// Extraneous or reordered segments in the raw value change nothing the
    /// signature covers, so they cannot smuggle unsigned content past
    /// verification.
    pub fn parse(raw: &str, key: &IdentityKey) -> Result<Self, VerifyError> {
        let claimed = codec::field(raw, codec::HMAC_FIELD).ok_or(VerifyError::Unsigned)?;
        let principal = codec::decode_payload(raw)?;

        let payload = codec::encode_payload(&principal);
        if !key.verify(&payload, claimed) {
            return Err(VerifyError::InvalidSignature);
        }

        Ok(Self {
            principal,
            payload,
            hmac: claimed.to_owned(),
        })
    }

    /// The literal cookie value: payload plus `&hmac=` plus signature.
    pub fn value(&self) -> String {
        format!("{}&{}={}", self.payload, codec::HMAC_FIELD, self.hmac)
    }

    pub fn principal(&self) -> &SessionPrincipal {
        &self.principal
    }

    pub fn into_principal(self) -> SessionPrincipal {
        self.principal
    }

    /// Builds the outgoing cookie with its fixed metadata.
    ///
    /// Path, Max-Age (1 hour, no sliding renewal) and HttpOnly are fixed;
    /// `secure` mirrors whether the originating request was made over TLS and
    /// is decided by the session layer.
    pub fn into_cookie(self, secure: bool) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, self.value()))
            .path(COOKIE_PATH)
            .max_age(COOKIE_TTL)
            .http_only(true)
            .secure(secure)
            .build()
    }
}

/// A zero-value cookie with the session cookie's name and path, used to
/// overwrite the client's copy on logout.
pub(crate) fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(COOKIE_NAME, "");
    cookie.set_path(COOKIE_PATH);
    cookie
}
