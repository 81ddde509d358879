use std::collections::BTreeSet;

use thiserror::Error;

/// Reasons a [`SessionPrincipal`] cannot be built from the given fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrincipalError {
    /// The username was empty or whitespace-only.
    #[error("username must not be blank")]
    BlankUsername,

    /// A role value was empty or whitespace-only.
    #[error("role values must not be blank")]
    BlankRole,

    /// A field value contained a character reserved by the cookie payload
    /// format (`&` everywhere, additionally `|` inside role values).
    #[error("{field} value contains a reserved delimiter character")]
    ReservedCharacter {
        /// Which field carried the offending value.
        field: &'static str,
    },
}

/// The authenticated identity carried by a session cookie.
///
/// Immutable once constructed; [`SessionPrincipal::with_attribute`] produces a
/// new value rather than mutating in place. Field values are validated at
/// construction so that the cookie payload encoding is guaranteed to decode
/// back to the same principal.
#[derive(Debug, Clone)]
pub struct SessionPrincipal {
    username: String,
    roles: Vec<String>,
    attribute: Option<String>,
}

impl SessionPrincipal {
    /// Builds a principal from a verified `(username, roles)` pair, as
    /// supplied by a credential check after a successful login.
    ///
    /// Duplicate roles are dropped; first-occurrence order is kept, and that
    /// order is the stable join order used by the cookie payload encoding.
    pub fn new<U, R, S>(username: U, roles: R) -> Result<Self, PrincipalError>
    where
        U: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(PrincipalError::BlankUsername);
        }
        if username.contains('&') {
            return Err(PrincipalError::ReservedCharacter { field: "username" });
        }

        let mut deduped = Vec::new();
        for role in roles {
            let role = role.into();
            if role.trim().is_empty() {
                return Err(PrincipalError::BlankRole);
            }
            if role.contains(['&', '|']) {
                return Err(PrincipalError::ReservedCharacter { field: "role" });
            }
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }

        Ok(Self {
            username,
            roles: deduped,
            attribute: None,
        })
    }

    /// Returns a copy of this principal carrying the given attribute value.
    ///
    /// A blank value clears the attribute, leaving it absent rather than
    /// empty.
    pub fn with_attribute<A: Into<String>>(&self, attribute: A) -> Result<Self, PrincipalError> {
        let attribute = attribute.into();
        if attribute.contains('&') {
            return Err(PrincipalError::ReservedCharacter { field: "attribute" });
        }

        let mut copy = self.clone();
        copy.attribute = if attribute.trim().is_empty() {
            None
        } else {
            Some(attribute)
        };
        Ok(copy)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Roles in stable join order.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

/// Role order is irrelevant for equality; roles compare as sets.
impl PartialEq for SessionPrincipal {
    fn eq(&self, other: &Self) -> bool {
        let roles: BTreeSet<&str> = self.roles.iter().map(String::as_str).collect();
        let other_roles: BTreeSet<&str> = other.roles.iter().map(String::as_str).collect();
        self.username == other.username && self.attribute == other.attribute && roles == other_roles
    }
}

impl Eq for SessionPrincipal {}

/// The request's identity as established by the session layer.
///
/// A closed variant: the cookie write path only accepts the
/// [`AuthIdentity::Authenticated`] case, so no foreign principal type can ever
/// reach it. [`AuthIdentity::Anonymous`] is the well-known "no authenticated
/// user" placeholder and is never persisted to a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthIdentity {
    /// No authenticated user for this request.
    #[default]
    Anonymous,
    /// A verified principal, either freshly logged in or reconstructed from a
    /// verified cookie.
    Authenticated(SessionPrincipal),
}

impl AuthIdentity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn principal(&self) -> Option<&SessionPrincipal> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(principal) => Some(principal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_is_rejected() {
        assert_eq!(
            SessionPrincipal::new("  ", Vec::<String>::new()).unwrap_err(),
            PrincipalError::BlankUsername
        );
    }

    #[test]
    fn delimiter_characters_are_rejected() {
        assert_eq!(
            SessionPrincipal::new("a&b", Vec::<String>::new()).unwrap_err(),
            PrincipalError::ReservedCharacter { field: "username" }
        );
        assert_eq!(
            SessionPrincipal::new("ab1234", ["USER|ADMIN"]).unwrap_err(),
            PrincipalError::ReservedCharacter { field: "role" }
        );

        let principal = SessionPrincipal::new("ab1234", ["USER"]).expect("principal builds");
        assert_eq!(
            principal.with_attribute("YELLOW&GREEN").unwrap_err(),
            PrincipalError::ReservedCharacter { field: "attribute" }
        );
    }

    #[test]
    fn duplicate_roles_are_dropped_and_order_kept() {
        let principal =
            SessionPrincipal::new("ab1234", ["USER", "TESTER", "USER"]).expect("principal builds");
        assert_eq!(principal.roles(), ["USER", "TESTER"]);
    }

    #[test]
    fn equality_ignores_role_order() {
        let a = SessionPrincipal::new("ab1234", ["USER", "TESTER"]).expect("principal builds");
        let b = SessionPrincipal::new("ab1234", ["TESTER", "USER"]).expect("principal builds");
        assert_eq!(a, b);
    }

    #[test]
    fn blank_attribute_clears() {
        let principal = SessionPrincipal::new("ab1234", ["USER"]).expect("principal builds");
        let with = principal.with_attribute("YELLOW").expect("attribute sets");
        assert_eq!(with.attribute(), Some("YELLOW"));

        let cleared = with.with_attribute("  ").expect("attribute clears");
        assert_eq!(cleared.attribute(), None);
        assert_ne!(with, cleared);
    }

    #[test]
    fn anonymous_has_no_principal() {
        assert!(AuthIdentity::Anonymous.is_anonymous());
        assert!(AuthIdentity::Anonymous.principal().is_none());
    }
}
