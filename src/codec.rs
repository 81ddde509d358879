//! Encoding and decoding of the cookie payload format.
//!
//! The canonical encoding is an ordered, `&`-joined sequence of `key=value`
//! segments: `uid=<username>&roles=<role1>|<role2>` with an optional trailing
//! `&colour=<attribute>`. It is both the cookie body and the exact byte
//! sequence the signature is computed over, so encoding must be a pure
//! function of the principal's fields.

use thiserror::Error;

use crate::principal::{PrincipalError, SessionPrincipal};

pub(crate) const UID_FIELD: &str = "uid";
pub(crate) const ROLES_FIELD: &str = "roles";
pub(crate) const ATTRIBUTE_FIELD: &str = "colour";
pub(crate) const HMAC_FIELD: &str = "hmac";

const ROLE_SEPARATOR: char = '|';

/// Reasons a payload cannot be decoded into a [`SessionPrincipal`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload carries no `uid` segment. A principal without an identity
    /// is never defaulted; this is a hard failure.
    #[error("payload contains no uid")]
    MissingIdentity,

    /// A decoded field value failed principal validation.
    #[error("payload field invalid: {0}")]
    InvalidField(#[from] PrincipalError),
}

/// Builds the canonical payload encoding for a principal.
///
/// An empty role set encodes as `roles=` (segment present, value empty); an
/// absent attribute omits the `colour` segment entirely.
pub fn encode_payload(principal: &SessionPrincipal) -> String {
    let mut payload = format!(
        "{UID_FIELD}={}&{ROLES_FIELD}={}",
        principal.username(),
        principal.roles().join("|"),
    );
    if let Some(attribute) = principal.attribute() {
        payload.push('&');
        payload.push_str(ATTRIBUTE_FIELD);
        payload.push('=');
        payload.push_str(attribute);
    }
    payload
}

/// Decodes a raw payload back into a [`SessionPrincipal`].
///
/// Each field is extracted by its own parser; one field's absence never
/// affects another's extraction, and unrecognized segments are ignored. A
/// missing `roles` segment yields an empty role set and a missing `colour`
/// segment an absent attribute; only a missing `uid` is an error.
pub fn decode_payload(raw: &str) -> Result<SessionPrincipal, DecodeError> {
    let username = field(raw, UID_FIELD).ok_or(DecodeError::MissingIdentity)?;
    let roles: Vec<&str> = field(raw, ROLES_FIELD)
        .map(|value| value.split(ROLE_SEPARATOR).collect())
        .unwrap_or_default();

    let principal = SessionPrincipal::new(username, roles)?;
    match field(raw, ATTRIBUTE_FIELD) {
        Some(attribute) => Ok(principal.with_attribute(attribute)?),
        None => Ok(principal),
    }
}

/// Extracts the value of the first `key=` segment, treating a blank value as
/// absent.
pub(crate) fn field<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    raw.split('&')
        .filter_map(|segment| segment.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
}
