//! Stateless, cookie-carried session identity for tower services.
//!
//! Instead of keeping authenticated-user state server-side, the entire
//! session payload (username, roles, one optional display attribute) is
//! serialized into a single `UserInfo` cookie, signed with HMAC-SHA512, and
//! verified on every request. The server holds no session state between
//! requests; the cookie round-tripped through the client *is* the state.
//!
//! [`CookieIdentityManagerLayer`] inserts an [`AuthSession`] into request
//! extensions. Handlers read the verified identity from it, establish a new
//! one after a successful credential check ([`AuthSession::login`]), or
//! request cookie removal ([`AuthSession::logout`]). On the way out the layer
//! writes at most one freshly signed cookie per response.
//!
//! # Security
//! The cookie is signed, not encrypted: its contents are readable by the
//! client, only unforgeable. Never put secrets in the payload.
//!
//! A request carrying a `UserInfo` cookie that fails verification is rejected
//! with a generic `401` rather than downgraded to anonymous; a tampered
//! cookie is treated as an attack signal, not a missing session. Only an
//! absent cookie means "anonymous".

pub mod codec;
mod cookie;
mod layer;
mod principal;
mod session;
mod signing;

pub use crate::cookie::{COOKIE_NAME, SignedUserCookie, VerifyError};
pub use crate::layer::{CookieIdentityManager, CookieIdentityManagerLayer};
pub use crate::principal::{AuthIdentity, PrincipalError, SessionPrincipal};
pub use crate::session::AuthSession;
pub use crate::signing::IdentityKey;
