//! Router-level tests that never reach the database: auth gates, input
//! validation, rate limiting and the middleware stack.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_offline_app, get, get_auth, post_json, post_json_auth, put_json_auth,
    token_for,
};
use serde_json::json;
use shared::models::Role;

#[tokio::test]
async fn health_reports_ok() {
    let response = get(build_offline_app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "cantine-server");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = get(build_offline_app(), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_requires_a_session() {
    let response = get(build_offline_app(), "/api/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], 1001);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let response = get_auth(build_offline_app(), "/api/orders", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 1004);
}

#[tokio::test]
async fn admin_routes_reject_clients() {
    let token = token_for("client-1", Role::Client);
    for uri in ["/api/admin/orders", "/api/admin/clients", "/api/admin/audit"] {
        let response = get_auth(build_offline_app(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body_json(response).await["code"], 2003);
    }
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    let response = get(build_offline_app(), "/api/admin/dishes").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_cannot_change_own_role() {
    let token = token_for("admin-1", Role::Admin);
    let response = put_json_auth(
        build_offline_app(),
        "/api/admin/clients/admin-1/role",
        &token,
        json!({ "role": "client" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], 2004);
}

#[tokio::test]
async fn sold_out_range_must_be_ordered() {
    let token = token_for("admin-1", Role::Admin);
    let response = put_json_auth(
        build_offline_app(),
        "/api/admin/dishes/1/sold-out",
        &token,
        json!({
            "sold_out": true,
            "sold_out_from": "2025-06-10T12:00:00Z",
            "sold_out_until": "2025-06-09T12:00:00Z",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_without_lines_fails_validation() {
    let token = token_for("client-1", Role::Client);
    let response = post_json_auth(
        build_offline_app(),
        "/api/orders",
        &token,
        json!({ "pickup_at": "2030-01-01T12:00:00Z", "lines": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 2);
}

#[tokio::test]
async fn option_category_is_checked() {
    let response = get(build_offline_app(), "/api/options/Not%20Valid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_malformed_email() {
    let response = post_json(
        build_offline_app(),
        "/api/auth/register",
        json!({ "email": "not-an-email", "password": "longenough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_is_rate_limited() {
    let app = build_offline_app();
    let body = json!({ "email": "bad", "password": "short" });

    for _ in 0..3 {
        let response = post_json(app.clone(), "/api/auth/register", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    let response = post_json(app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["code"], 1010);
}
