// SPDX-License-Identifier: MIT

//! Request-level validation and error mapping.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn json_post(uri: &str, user_id: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(uid) = user_id {
        builder = builder.header("x-user-id", uid);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_user_header_is_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/v1/workouts",
            None,
            r#"{"name":"Push Day"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_exercise_name_is_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/v1/exercises",
            None,
            r#"{"name":"","muscle_groups":["chest"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workout_exercise_order_zero_is_rejected() {
    let (app, state) = common::create_test_app();
    let exercise_id = common::seed_exercise(&state, "Bench").await;

    let body = format!(
        r#"{{"name":"Push Day","exercises":[{{"exercise_id":"{}","sets":3,"reps":10,"order":0}}]}}"#,
        exercise_id
    );
    let response = app
        .oneshot(json_post("/api/v1/workouts", Some(common::USER), &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_workout_id_maps_to_not_found() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/workouts/no-such-id")
                .header("x-user-id", common::USER)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dangling_child_reference_maps_to_unprocessable() {
    let (app, _state) = common::create_test_app();

    let body = r#"{"name":"Push Day","exercises":[{"exercise_id":"no-such-exercise","sets":3,"reps":10,"order":1}]}"#;
    let response = app
        .oneshot(json_post("/api/v1/workouts", Some(common::USER), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_referenced_exercise_delete_maps_to_conflict() {
    let (app, state) = common::create_test_app();
    let exercise_id = common::seed_exercise(&state, "Bench").await;
    common::seed_workout(&state, common::USER, "Push", &[&exercise_id]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/v1/exercises/{}", exercise_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_email_on_user_create_is_rejected() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post(
            "/api/v1/users",
            None,
            r#"{"email":"not-an-email"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
