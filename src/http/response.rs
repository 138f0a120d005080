//! API error responses.
//!
//! Every failure leaves the server as
//! `{"error": {"code": "...", "message": "..."}}` with a matching status.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::guild::GuildError;
use crate::prayer::PrayerError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<GuildError> for ApiError {
    fn from(err: GuildError) -> Self {
        let (status, code) = match &err {
            GuildError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            GuildError::NotAMember(_) => (StatusCode::FORBIDDEN, "not_a_member"),
            GuildError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            GuildError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            GuildError::Invalid(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "Store failure");
        Self::internal("storage failure")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingHeader | AuthError::MalformedHeader => {
                Self::new(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
            }
            AuthError::InvalidToken(_) => {
                Self::new(StatusCode::FORBIDDEN, "invalid_token", err.to_string())
            }
            AuthError::Signing(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<PrayerError> for ApiError {
    fn from(err: PrayerError) -> Self {
        match err {
            PrayerError::Busy => Self::new(StatusCode::CONFLICT, "busy", err.to_string()),
            other => Self::new(StatusCode::BAD_GATEWAY, "prayer_failed", other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "invalid_body", rejection.body_text())
    }
}
