//! Minimal axum app showing the collaborator surface: an in-memory credential
//! check on `/login`, a post-login attribute update on `/colour`, and cookie
//! removal on `/logout`.
//!
//! Try it:
//!   cargo run --example axum_login
//!   curl -v -c jar.txt 'http://127.0.0.1:3000/login?user=bob&password=builder'
//!   curl -v -b jar.txt 'http://127.0.0.1:3000/'
//!   curl -v -b jar.txt -c jar.txt 'http://127.0.0.1:3000/colour?value=YELLOW'
//!   curl -v -b jar.txt -c jar.txt 'http://127.0.0.1:3000/logout'

use std::{collections::HashMap, net::SocketAddr};

use axum::{
    Extension, Router,
    extract::Query,
    http::StatusCode,
    routing::get,
};
use tower_cookie_identity::{
    AuthSession, CookieIdentityManagerLayer, IdentityKey, SessionPrincipal,
};

/// Fixed credential entries, checked at login. This is the credential-check
/// collaborator the identity layer itself deliberately knows nothing about.
struct CredentialStore {
    users: Vec<(&'static str, &'static str, &'static [&'static str])>,
}

impl CredentialStore {
    fn demo() -> Self {
        Self {
            users: vec![("bob", "builder", &["USER", "TESTER"])],
        }
    }

    fn check(&self, user: &str, password: &str) -> Option<SessionPrincipal> {
        self.users
            .iter()
            .find(|(u, p, _)| *u == user && *p == password)
            .and_then(|(u, _, roles)| SessionPrincipal::new(*u, roles.iter().copied()).ok())
    }
}

async fn index(Extension(session): Extension<AuthSession>) -> String {
    match session.principal() {
        Some(principal) => format!(
            "hello {} (roles: {}, colour: {})\n",
            principal.username(),
            principal.roles().join(", "),
            principal.attribute().unwrap_or("none"),
        ),
        None => "hello anonymous\n".to_owned(),
    }
}

async fn login(
    Extension(session): Extension<AuthSession>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<&'static str, StatusCode> {
    let user = params.get("user").ok_or(StatusCode::BAD_REQUEST)?;
    let password = params.get("password").ok_or(StatusCode::BAD_REQUEST)?;

    let principal = CredentialStore::demo()
        .check(user, password)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    session.login(principal);
    Ok("logged in\n")
}

async fn colour(
    Extension(session): Extension<AuthSession>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<&'static str, StatusCode> {
    let value = params.get("value").ok_or(StatusCode::BAD_REQUEST)?;
    session
        .set_attribute(value)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok("colour set\n")
}

async fn logout(Extension(session): Extension<AuthSession>) -> &'static str {
    session.logout();
    "logged out\n"
}

#[tokio::main]
async fn main() {
    // The one piece of configuration this crate needs: the pre-shared
    // signing secret. Use a long random value in a real deployment.
    let key = IdentityKey::new("demo-only-signing-key-do-not-deploy");
    let identity_layer = CookieIdentityManagerLayer::new(key);

    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/colour", get(colour))
        .route("/logout", get(logout))
        .layer(identity_layer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
