//! The per-request session handle exposed through request extensions.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::principal::{AuthIdentity, PrincipalError, SessionPrincipal};

/// Handle to the identity established for the current request/response cycle.
///
/// The session layer inserts one into request extensions; handlers read the
/// loaded identity and may establish a new one via [`AuthSession::login`],
/// refresh its attribute, or request logout. Clones share state, so a change
/// made by a handler is visible to the layer when the response is written.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    identity: Mutex<AuthIdentity>,
    modified: AtomicBool,
    logout: AtomicBool,
    cookie_written: AtomicBool,
}

impl AuthSession {
    pub(crate) fn from_identity(identity: AuthIdentity) -> Self {
        Self {
            inner: Arc::new(Inner {
                identity: Mutex::new(identity),
                ..Inner::default()
            }),
        }
    }

    /// The identity loaded from the cookie or established this request.
    ///
    /// A poisoned lock degrades to [`AuthIdentity::Anonymous`]; trust is never
    /// granted on a failure path.
    pub fn identity(&self) -> AuthIdentity {
        self.inner
            .identity
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn principal(&self) -> Option<SessionPrincipal> {
        self.identity().principal().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.identity().is_anonymous()
    }

    /// Establishes a verified principal as this request's identity.
    ///
    /// Called by the credential-check collaborator after a successful login;
    /// the layer persists the identity into a freshly signed cookie when the
    /// response is written.
    pub fn login(&self, principal: SessionPrincipal) {
        if let Ok(mut guard) = self.inner.identity.lock() {
            *guard = AuthIdentity::Authenticated(principal);
        }
        self.inner.logout.store(false, Ordering::Release);
        self.inner.modified.store(true, Ordering::Release);
    }

    /// Replaces the current principal with a copy carrying the given
    /// attribute. A no-op for anonymous requests.
    pub fn set_attribute(&self, attribute: &str) -> Result<(), PrincipalError> {
        let mut guard = match self.inner.identity.lock() {
            Ok(guard) => guard,
            Err(_) => return Ok(()),
        };

        let updated = match &*guard {
            AuthIdentity::Anonymous => {
                tracing::debug!("anonymous identity, skip attribute update");
                return Ok(());
            }
            AuthIdentity::Authenticated(principal) => principal.with_attribute(attribute)?,
        };

        *guard = AuthIdentity::Authenticated(updated);
        drop(guard);
        self.inner.modified.store(true, Ordering::Release);
        Ok(())
    }

    /// Requests removal of the session cookie when the response is written.
    pub fn logout(&self) {
        if let Ok(mut guard) = self.inner.identity.lock() {
            *guard = AuthIdentity::Anonymous;
        }
        self.inner.logout.store(true, Ordering::Release);
        self.inner.modified.store(true, Ordering::Release);
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.inner.modified.load(Ordering::Acquire)
    }

    pub(crate) fn logout_requested(&self) -> bool {
        self.inner.logout.load(Ordering::Acquire)
    }

    /// Claims the single cookie write allowed per response cycle. Returns
    /// `true` only for the first caller.
    pub(crate) fn claim_cookie_write(&self) -> bool {
        self.inner
            .cookie_written
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
