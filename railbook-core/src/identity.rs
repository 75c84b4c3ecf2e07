use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{AuthError, AuthResult};

const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Bearer token payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub exp: usize,
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> AuthResult<String> {
        let exp = (Utc::now() + self.ttl).timestamp().max(0) as usize;
        let claims = Claims {
            id: user_id,
            email: email.to_owned(),
            exp,
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> AuthResult<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Checks signature and expiry. Pure: no lookups, no side effects.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

/// bcrypt is deliberately slow, so hashing runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub async fn verify_password(password: String, hash: String) -> AuthResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_then_verify_round_trip() {
        let keys = TokenKeys::new(SECRET, 3600);
        let token = keys.issue(42, "rail@example.com").unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email, "rail@example.com");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = TokenKeys::new("another-secret", 3600)
            .issue(1, "a@example.com")
            .unwrap();
        assert!(matches!(
            TokenKeys::new(SECRET, 3600).verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = TokenKeys::new(SECRET, 3600);
        let claims = Claims {
            id: 1,
            email: "a@example.com".to_string(),
            exp: (Utc::now().timestamp() - 3600) as usize,
        };
        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let keys = TokenKeys::new(SECRET, 3600);
        let mut token = keys.issue(1, "a@example.com").unwrap();
        token.push('x');
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(keys.verify("not-a-jwt"), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_password_hash_verifies() {
        let hash = hash_password("s3cret".to_string(), 4).await.unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashing_and_signing_failures_are_distinct() {
        assert!(matches!(
            hash_password("pw".to_string(), 3).await,
            Err(AuthError::Hashing(_))
        ));
        let err = AuthError::Token("bad key".to_string());
        assert_eq!(err.to_string(), "Token signing failed: bad key");
    }
}
