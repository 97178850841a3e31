//! Request extractors whose rejections render as [`ApiError`] bodies.

use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    FromRequest, FromRequestParts,
};

use super::error::ApiError;

/// `axum::Json` for request bodies; a missing field or bad syntax becomes a 400 `ApiError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with the same error shape as every other failure.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
