//! HS256 bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::guild::ops::PLACEHOLDER_AVATAR;
use crate::guild::UserProfile;

/// Claims issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Ronin wallet linked to the account, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<String>,
}

impl Claims {
    /// Claims for `sub` expiring after `ttl`.
    pub fn new(sub: impl Into<String>, ttl: Duration) -> Self {
        Self {
            sub: sub.into(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
            name: None,
            picture: None,
            wallet: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.sub.clone(),
            name: self
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "User".to_string()),
            avatar_url: self
                .picture
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
            wallet_address: self.wallet.clone(),
        }
    }
}

/// Validates tokens against a shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

/// Sign `claims` with `secret`. Used by the CLI and tests.
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_verify() {
        let claims = Claims::new("user-1", Duration::hours(1)).with_name("Ada");
        let token = issue_token(SECRET, &claims).unwrap();
        let verified = TokenVerifier::new(SECRET, 0).verify(&token).unwrap();
        assert_eq!(verified.sub, "user-1");
        assert_eq!(verified.profile().name, "Ada");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(SECRET, &Claims::new("user-1", Duration::hours(1))).unwrap();
        let err = TokenVerifier::new("other", 0).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_expired_rejected() {
        let token = issue_token(SECRET, &Claims::new("user-1", Duration::hours(-2))).unwrap();
        assert!(TokenVerifier::new(SECRET, 30).verify(&token).is_err());
    }

    #[test]
    fn test_profile_defaults() {
        let profile = Claims::new("u", Duration::hours(1)).profile();
        assert_eq!(profile.name, "User");
        assert_eq!(profile.avatar_url, PLACEHOLDER_AVATAR);
        assert!(profile.wallet_address.is_none());
    }
}
