//! Tower layer wiring the signed-cookie identity into the request lifecycle.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use tower_cookies::{CookieManager, Cookies};
use tower_layer::Layer;
use tower_service::Service;

use crate::{
    cookie::{self, COOKIE_NAME, SignedUserCookie},
    principal::AuthIdentity,
    session::AuthSession,
    signing::IdentityKey,
};

/// Layer providing an [`AuthSession`] request extension backed by the signed
/// `UserInfo` cookie.
///
/// Wraps the inner service in [`tower_cookies::CookieManager`], so the layer
/// is self-contained; no separate cookie middleware is required.
#[derive(Debug, Clone)]
pub struct CookieIdentityManagerLayer {
    key: Arc<IdentityKey>,
}

impl CookieIdentityManagerLayer {
    /// Builds the layer around the process-wide signing key.
    pub fn new(key: IdentityKey) -> Self {
        Self { key: Arc::new(key) }
    }
}

impl<S> Layer<S> for CookieIdentityManagerLayer {
    type Service = CookieManager<CookieIdentityManager<S>>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieManager::new(CookieIdentityManager {
            inner,
            key: self.key.clone(),
        })
    }
}

/// The per-request service produced by [`CookieIdentityManagerLayer`].
///
/// On the way in it loads and verifies the session cookie; on the way out it
/// writes at most one freshly signed cookie, and only when a non-anonymous
/// identity was established or changed during this cycle.
#[derive(Debug, Clone)]
pub struct CookieIdentityManager<S> {
    inner: S,
    key: Arc<IdentityKey>,
}

impl<ReqBody, ResBody, S> Service<Request<ReqBody>> for CookieIdentityManager<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Default + Send,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let key = self.key.clone();

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let cookies = match req.extensions().get::<Cookies>().cloned() {
                Some(cookies) => cookies,
                None => {
                    let mut res = Response::default();
                    *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                    return Ok(res);
                }
            };

            let secure_request = request_is_secure(&req);

            let identity = match cookies.get(COOKIE_NAME) {
                Some(raw) => match SignedUserCookie::parse(raw.value(), &key) {
                    Ok(signed) => AuthIdentity::Authenticated(signed.into_principal()),
                    Err(err) => {
                        // A present-but-invalid cookie is an attack signal,
                        // not a missing session: reject instead of silently
                        // downgrading to anonymous. The client only sees a
                        // generic authentication failure; which check failed
                        // stays in the logs.
                        tracing::warn!(err = %err, "UserInfo cookie failed verification");
                        let mut res = Response::default();
                        *res.status_mut() = http::StatusCode::UNAUTHORIZED;
                        return Ok(res);
                    }
                },
                None => {
                    if cookies.list().is_empty() {
                        tracing::debug!("no cookies in request");
                    } else {
                        tracing::debug!("no UserInfo cookie in request");
                    }
                    AuthIdentity::Anonymous
                }
            };

            let session = AuthSession::from_identity(identity);
            req.extensions_mut().insert(session.clone());

            let res = inner.call(req).await?;

            if session.logout_requested() {
                cookies.remove(cookie::removal_cookie());
                return Ok(res);
            }

            if session.is_modified()
                && !res.status().is_server_error()
                && session.claim_cookie_write()
            {
                match session.identity() {
                    AuthIdentity::Authenticated(principal) => {
                        tracing::debug!(
                            user = principal.username(),
                            "identity saved in UserInfo cookie"
                        );
                        let signed = SignedUserCookie::new(principal, &key);
                        cookies.add(signed.into_cookie(secure_request));
                    }
                    AuthIdentity::Anonymous => {
                        tracing::debug!("anonymous identity, skip cookie save");
                    }
                }
            }

            Ok(res)
        })
    }
}

/// Whether the originating request was made over TLS; the outgoing cookie's
/// `Secure` flag mirrors this.
fn request_is_secure<B>(req: &Request<B>) -> bool {
    if req.uri().scheme() == Some(&http::uri::Scheme::HTTPS) {
        return true;
    }

    // Behind a terminating proxy the scheme is only visible via the
    // forwarded-proto header.
    req.headers()
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}
