//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly; no router is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use setlist_api::error::AppError;
use setlist_core::error::CoreError;
use setlist_core::types::DbId;
use setlist_db::StoreError;

/// Convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn missing_setlist_returns_404_with_entity_message() {
    let err = AppError::Core(CoreError::setlist_not_found(DbId::new_v4()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Setlist not found");
}

#[tokio::test]
async fn missing_song_returns_404_with_entity_message() {
    let err = AppError::Core(CoreError::song_not_found(DbId::new_v4()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Song not found");
}

#[tokio::test]
async fn invariant_violation_returns_400_verbatim() {
    let err = AppError::Core(CoreError::InvariantViolation(
        "Cannot delete the last setlist".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVARIANT_VIOLATION");
    assert_eq!(json["error"], "Cannot delete the last setlist");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("invalid field(s): title".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "invalid field(s): title");
}

#[tokio::test]
async fn store_failure_returns_500_and_hides_details() {
    let err = AppError::Store(StoreError::Unavailable("primary at 10.0.0.5 refused".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
