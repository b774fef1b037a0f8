// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid session tokens
//! 2. Any authenticated session may reach the management routes
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use gympro_api::models::Role;
use tower::ServiceExt;

mod common;
use common::{
    admin_claims, body_json, create_test_app, json_request, member_claims, session_token,
    session_token_for, stored_user,
};

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/api/v1/routines", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["errorCode"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(json_request(
            Method::GET,
            "/api/v1/routines",
            Some("invalid.token.here"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid session");
}

#[tokio::test]
async fn test_token_for_other_project_is_rejected() {
    let app = create_test_app();
    let token = session_token_for(&member_claims("uid-1"), "someone-elses-project");

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/api/v1/routines", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let app = create_test_app();
    let token = session_token(&member_claims("uid-1"));

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/api/v1/routines", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_management_needs_only_a_session() {
    let app = create_test_app();
    app.users
        .insert(stored_user("uid-2", "Bea", Role::User, "2030-01-01"));
    let token = session_token(&member_claims("uid-1"));

    for uri in ["/api/v1/users", "/api/v1/users/active", "/api/v1/users/uid-2"] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(Method::GET, uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = app
        .router
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/users", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_can_delete_other_user() {
    let app = create_test_app();
    app.users
        .insert(stored_user("uid-2", "Bea", Role::User, "2030-01-01"));
    let token = session_token(&member_claims("uid-1"));

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/users/uid-2",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.users.get("uid-2").is_none());
}

#[tokio::test]
async fn test_admin_can_list_users() {
    let app = create_test_app();
    let token = session_token(&admin_claims("admin-1"));

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/api/v1/users", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalItems"], 0);
}

#[tokio::test]
async fn test_members_can_update_their_profile_without_admin() {
    let app = create_test_app();
    app.users
        .insert(stored_user("uid-1", "Ana", Role::User, "2030-01-01"));
    let token = session_token(&member_claims("uid-1"));

    let response = app
        .router
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/users/uid-1",
            Some(&token),
            Some(serde_json::json!({ "name": "Ana", "subscription": "2030-01-01" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/users")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "50");
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
