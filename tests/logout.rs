// Tests for cookie removal on logout.
mod common;

use axum::body::Body;
use http::{Request, StatusCode, header};
use tower::ServiceExt as _;

#[tokio::test]
async fn logout_overwrites_cookie_with_expired_empty_value() {
    let app = common::routes().layer(common::make_layer());

    let req = Request::builder()
        .uri("/login")
        .body(Body::empty())
        .expect("request builds successfully");
    let res = app
        .clone()
        .oneshot(req)
        .await
        .expect("service call succeeds");
    let cookie = common::get_session_cookie(&res);

    let req = Request::builder()
        .uri("/logout")
        .header(header::COOKIE, common::cookie_header_value(&cookie))
        .body(Body::empty())
        .expect("request builds successfully");
    let res = app.oneshot(req).await.expect("service call succeeds");

    // A zero-value cookie with the same name and path overwrites the
    // client's copy.
    let removal = common::get_session_cookie(&res);
    assert_eq!(removal.name(), "UserInfo");
    assert_eq!(removal.value(), "");
    assert_eq!(removal.path(), Some("/"));
    assert_eq!(
        removal.max_age().map(|age| age.whole_seconds()),
        Some(0),
        "removal cookie expires immediately"
    );
}

#[tokio::test]
async fn request_after_logout_is_anonymous() {
    let app = common::routes().layer(common::make_layer());

    let req = Request::builder()
        .uri("/whoami")
        .body(Body::empty())
        .expect("request builds successfully");
    let res = app.oneshot(req).await.expect("service call succeeds");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body_string(res.into_body()).await, "anonymous");
}
