//! Axum middleware for authentication.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{field, info_span, warn, Instrument};

use crate::api::error::ApiError;
use crate::auth::jwt::TokenCodec;
use crate::auth::models::{bearer_token, AuthContext, AuthError};
use crate::observability::MetricsRecorder;

pub type TokenCodecState = Arc<TokenCodec>;

/// Message returned for every authentication failure, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid token";

/// Verify the bearer token and bind its subject to the request as [`AuthContext`].
///
/// Runs before the handler, so a rejected request never reaches storage.
pub async fn authenticate(
    State(codec): State<TokenCodecState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %request.method(),
        http.path = %request.uri().path(),
        auth.user_id = field::Empty,
        correlation_id = %correlation_id
    );

    let header = request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    let verified = bearer_token(header)
        .and_then(|token| codec.verify(token).map_err(AuthError::from))
        .map(AuthContext::from);

    match verified {
        Ok(context) => {
            MetricsRecorder::new().record_authentication("success");
            span.record("auth.user_id", field::display(context.user_id));
            request.extensions_mut().insert(context);
            Ok(next.run(request).instrument(span).await)
        }
        Err(err) => {
            let error_type = err.error_type();
            MetricsRecorder::new().record_authentication(&error_type.to_string());
            span.in_scope(|| {
                warn!(%correlation_id, %error_type, error = %err, "authentication failed")
            });
            Err(ApiError::unauthorized(UNAUTHORIZED_MESSAGE))
        }
    }
}
