#![allow(dead_code)]

// Shared helpers for integration tests.
//
// These helpers use `tower_cookies::Cookie` parsing/encoding to match what the
// layer emits in `Set-Cookie` and what browsers send back in `Cookie`.
use axum::{Extension, Router, body::Body, routing::get};
use http::{HeaderMap, Response, header};
use http_body_util::BodyExt as _;
use tower_cookies::Cookie;
use tower_cookie_identity::{
    AuthSession, CookieIdentityManagerLayer, IdentityKey, SessionPrincipal,
};

// The fixture signing key shared by the unit tests.
pub const KEY: &str = "y.E@EA!FbtCwXYB-2v_n.!*xgzRqgtbq2d2_A_U!W2hubL@URHRzNP96WNPxEcXK";

pub async fn body_string(body: Body) -> String {
    // Collect an Axum body into a UTF-8 string for assertions.
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn test_principal() -> SessionPrincipal {
    SessionPrincipal::new("ab1234", ["USER", "TESTER"]).expect("principal builds")
}

pub fn make_layer() -> CookieIdentityManagerLayer {
    CookieIdentityManagerLayer::new(IdentityKey::new(KEY))
}

// Routes exercising the collaborator surface: login, identity read-back,
// attribute update, logout.
pub fn routes() -> Router {
    Router::new()
        .route(
            "/login",
            get(|Extension(session): Extension<AuthSession>| async move {
                session.login(test_principal());
            }),
        )
        .route(
            "/login-twice",
            get(|Extension(session): Extension<AuthSession>| async move {
                session.login(test_principal());
                session.login(test_principal());
            }),
        )
        .route(
            "/whoami",
            get(|Extension(session): Extension<AuthSession>| async move {
                session
                    .principal()
                    .map(|p| p.username().to_owned())
                    .unwrap_or_else(|| "anonymous".to_owned())
            }),
        )
        .route(
            "/colour",
            get(|Extension(session): Extension<AuthSession>| async move {
                session
                    .set_attribute("YELLOW")
                    .expect("attribute value is valid");
            }),
        )
        .route(
            "/logout",
            get(|Extension(session): Extension<AuthSession>| async move {
                session.logout();
            }),
        )
}

pub fn get_session_cookie<B>(res: &Response<B>) -> Cookie<'static> {
    get_session_cookie_from_headers(res.headers())
}

pub fn get_session_cookie_from_headers(headers: &HeaderMap) -> Cookie<'static> {
    // Parse the `Set-Cookie` header into a `Cookie` structure.
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("response includes set-cookie header");
    let set_cookie = set_cookie
        .to_str()
        .expect("set-cookie header is valid utf-8");
    Cookie::parse_encoded(set_cookie)
        .expect("set-cookie parses successfully")
        .into_owned()
}

pub fn cookie_header_value(cookie: &Cookie<'_>) -> String {
    // Encode a cookie for use in a `Cookie` request header.
    cookie.encoded().to_string()
}
