//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs signed with `auth.jwt_secret`. A missing or
//! malformed `Authorization` header is a 401; a token that fails
//! verification is a 403.

pub mod extract;
pub mod token;

use thiserror::Error;

pub use extract::AuthUser;
pub use token::{issue_token, Claims, TokenVerifier};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}
