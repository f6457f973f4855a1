use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub email: String,
    pub roles: Vec<String>,
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued at timestamp
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token is malformed")]
    Malformed,
    #[error("Failed to sign token")]
    Signing,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing => AppError::Internal(err.to_string()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    roles: &[String],
    secret: &str,
    expiration_minutes: i64,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = now + Duration::minutes(expiration_minutes);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        roles: roles.to_vec(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create token");
        TokenError::Signing
    })
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_round_trip_claims() {
        let id = Uuid::new_v4();
        let token = create_token(id, "agent@mail.com", &roles(&["AGENT"]), SECRET, 15).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "agent@mail.com");
        assert!(claims.has_role("AGENT"));
        assert!(!claims.has_role("ADMIN"));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token() {
        let token = create_token(Uuid::new_v4(), "a@b.com", &roles(&["ADMIN"]), SECRET, -5).unwrap();
        assert_eq!(verify_token(&token, SECRET), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_token(Uuid::new_v4(), "a@b.com", &roles(&["ADMIN"]), SECRET, 15).unwrap();
        assert_eq!(
            verify_token(&token, "another-secret"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(verify_token("not.a.jwt", SECRET), Err(TokenError::Malformed));
        assert_eq!(verify_token("", SECRET), Err(TokenError::Malformed));
    }
}
