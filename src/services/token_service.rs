use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, dangerous, decode, encode,
    errors::ErrorKind, get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::{AppError, AppResult, AuthFailure},
    models::Role,
};

/// Lifetime of every issued token.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Identity claims carried by a token. Nothing else is embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => AuthFailure::InvalidToken,
            TokenError::Expired => AuthFailure::Expired,
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

/// Issues and verifies HS256 tokens signed with the single application secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: i32, role: Role) -> AppResult<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub fn issue_at(&self, user_id: i32, role: Role, issued_at: DateTime<Utc>) -> AppResult<String> {
        let expires_at = issued_at
            .checked_add_signed(Duration::days(TOKEN_TTL_DAYS))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            id: user_id,
            role,
            exp: expires_at.timestamp().max(0) as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
        tracing::debug!(user_id, role = %role, "token issued");
        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// Expiry is judged before the signature, so a stale token is reported as
    /// `Expired` whether or not its signature checks out. Neither outcome lets it through.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let unverified = dangerous::insecure_decode::<Claims>(token).map_err(classify)?;
        if (unverified.claims.exp as u64) < get_current_timestamp() {
            return Err(TokenError::Expired);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(classify)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_the_same_identity() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(42, Role::StoreOwner).expect("issue");

        let claims = tokens.verify(&token).expect("verify");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, Role::StoreOwner);

        let expected = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
        assert!(claims.exp.abs_diff(expected) <= 5);
    }

    #[test]
    fn token_past_expiry_is_expired() {
        let tokens = TokenService::new("test-secret");
        let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 1);
        let token = tokens.issue_at(7, Role::Normal, issued_at).expect("issue");

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn expired_token_with_foreign_signature_is_still_expired() {
        let ours = TokenService::new("test-secret");
        let theirs = TokenService::new("another-secret");
        let issued_at = Utc::now() - Duration::days(TOKEN_TTL_DAYS + 2);
        let token = theirs.issue_at(7, Role::Admin, issued_at).expect("issue");

        assert_eq!(ours.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_signature_is_malformed() {
        let ours = TokenService::new("test-secret");
        let theirs = TokenService::new("another-secret");
        let token = theirs.issue(7, Role::Admin).expect("issue");

        assert_eq!(ours.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = TokenService::new("test-secret");
        assert_eq!(tokens.verify("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(tokens.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue(1, Role::Normal).expect("issue");
        let admin = tokens.issue(1, Role::Admin).expect("issue");

        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);

        assert_eq!(tokens.verify(&forged), Err(TokenError::Malformed));
    }

    #[test]
    fn token_without_expiry_is_malformed() {
        let tokens = TokenService::new("test-secret");
        let claims = serde_json::json!({ "id": 1, "role": "admin" });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("encode");

        assert_eq!(tokens.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn token_errors_map_to_auth_failures() {
        assert_eq!(AuthFailure::from(TokenError::Expired), AuthFailure::Expired);
        assert_eq!(
            AuthFailure::from(TokenError::Malformed),
            AuthFailure::InvalidToken
        );
    }
}
