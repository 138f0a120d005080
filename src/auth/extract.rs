//! `AuthUser` extractor for protected handlers.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use crate::auth::token::{Claims, TokenVerifier};
use crate::auth::AuthError;
use crate::guild::UserProfile;
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// The caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    pub fn profile(&self) -> UserProfile {
        self.claims.profile()
    }
}

/// Token part of an `Authorization: Bearer <token>` header value.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingHeader)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|v| v.to_str().map_err(|_| AuthError::MalformedHeader))
            .transpose()?;
        let token = bearer_token(header)?;

        // Secret is read per request so reloads apply immediately.
        let config = state.config.load();
        let verifier = TokenVerifier::new(&config.auth.jwt_secret, config.auth.leeway_secs);
        let claims = verifier.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            e
        })?;

        Ok(AuthUser { claims })
    }
}
