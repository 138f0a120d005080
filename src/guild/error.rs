//! Guild operation errors.

use thiserror::Error;

/// Errors raised by guild operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuildError {
    /// Referenced entity does not exist in the guild (or the guild itself).
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The acting user has no member record in the guild.
    #[error("User {0} is not a member of this guild")]
    NotAMember(String),

    /// The acting member's role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation conflicts with the current document state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request data failed validation.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl GuildError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        GuildError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type GuildResult<T> = Result<T, GuildError>;
