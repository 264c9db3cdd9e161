//! Login, session cookie round-trips, and route protection.

mod common;

use axum::http::Method;
use common::{response_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn login_sets_cookie_accepted_by_me() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "name": "maria", "password": "staff-pass" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("pos_session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "maria");
    assert_eq!(body["data"]["isAdmin"], false);

    // The cookie pair alone authenticates /api/auth/me.
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
    let response = app
        .request(Method::POST, "/api/auth/me", None, Some(&cookie_pair))
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "maria");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "name": "maria", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 401);

    // Unknown user yields the same status as a bad password.
    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "name": "nobody", "password": "staff-pass" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn missing_credentials_are_invalid() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "name": "", "password": "" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = TestApp::new().await;

    for uri in [
        "/api/tables",
        "/api/sales",
        "/api/categories",
        "/api/products",
        "/api/settings",
        "/api/notifications/stream",
    ] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status(), 401, "{uri} should require a session");
    }

    let response = app
        .request(Method::POST, "/api/orders", Some(json!({})), None)
        .await;
    assert_eq!(response.status(), 401);

    let response = app.request(Method::POST, "/api/auth/me", None, None).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn garbage_cookie_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/tables",
            None,
            Some("pos_session=not-a-token"),
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/auth/logout", None, None)
        .await;
    assert_eq!(response.status(), 200);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("logout clears the cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), 200);
}
