// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routine catalog endpoints.

use axum::http::{Method, StatusCode};
use gympro_api::models::Routine;
use tower::ServiceExt;

mod common;
use common::{
    admin_claims, body_json, create_test_app, json_request, multipart_request, session_token,
};

fn routine(id: &str, group: &str, name: &str) -> Routine {
    Routine {
        id: id.to_string(),
        muscle_group: group.to_string(),
        name: name.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_add_routine_assigns_missing_id() {
    let app = create_test_app();
    let token = session_token(&admin_claims("admin-1"));

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/routines",
            Some(&token),
            Some(serde_json::json!({
                "muscle_group": "espalda",
                "name": "Remo",
                "description": "Remo con barra",
                "video_url": "https://videos.example.com/remo"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let routines = app.routines.routines.lock().unwrap().clone();
    assert_eq!(routines.len(), 1);
    assert_eq!(routines[0].name, "Remo");
    assert!(uuid::Uuid::parse_str(&routines[0].id).is_ok());
}

#[tokio::test]
async fn test_list_routines_by_muscle_group() {
    let app = create_test_app();
    app.routines.routines.lock().unwrap().extend([
        routine("r1", "pecho", "Press banca"),
        routine("r2", "pierna", "Sentadilla"),
        routine("r3", "pecho", "Aperturas"),
    ]);
    let token = session_token(&admin_claims("admin-1"));

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/api/v1/routines?muscle_group=pecho",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = app
        .router
        .oneshot(json_request(Method::GET, "/api/v1/routines", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_routine_image() {
    let app = create_test_app();
    app.routines
        .routines
        .lock()
        .unwrap()
        .push(routine("r1", "pecho", "Press banca"));
    let token = session_token(&admin_claims("admin-1"));

    let response = app
        .router
        .clone()
        .oneshot(multipart_request(
            "/api/v1/routines/image/r1",
            &token,
            "image",
            b"png bytes",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let routines = app.routines.routines.lock().unwrap().clone();
    assert!(routines[0]
        .image_url
        .contains("routines%2Froutine_r1.png?alt=media"));
}

#[tokio::test]
async fn test_update_image_of_unknown_routine() {
    let app = create_test_app();
    let token = session_token(&admin_claims("admin-1"));

    let response = app
        .router
        .oneshot(multipart_request(
            "/api/v1/routines/image/missing",
            &token,
            "image",
            b"png bytes",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
