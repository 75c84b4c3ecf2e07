use std::sync::Arc;

use railbook_shared::User;
use serde::Serialize;
use tracing::info;

use crate::identity::{self, Claims, TokenKeys};
use crate::repository::{NewUser, UserRepository};
use crate::{AuthError, AuthResult, StoreError};

/// Token plus the public profile it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: TokenKeys,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: TokenKeys, bcrypt_cost: u32) -> Self {
        Self {
            users,
            keys,
            bcrypt_cost,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthSession> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AuthError::Validation("a valid email is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = identity::hash_password(password.to_owned(), self.bcrypt_cost).await?;
        let new_user = NewUser {
            name: name.to_owned(),
            email,
            password_hash,
        };

        // A concurrent registration can slip between the lookup and the insert.
        let user = self.users.create_user(&new_user).await.map_err(|e| match e {
            StoreError::Duplicate(_) => AuthError::DuplicateEmail,
            other => AuthError::Store(other),
        })?;

        info!(user_id = user.id, "User registered");
        self.session_for(user)
    }

    /// Unknown email and wrong password fail with the same error.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let email = normalize_email(email);
        let credentials = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = identity::verify_password(
            password.to_owned(),
            credentials.password_hash.into_inner(),
        )
        .await?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.session_for(credentials.user)
    }

    /// `None` means no token was presented at all.
    pub fn verify(&self, token: Option<&str>) -> AuthResult<Claims> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.keys.verify(token)
    }

    fn session_for(&self, user: User) -> AuthResult<AuthSession> {
        let token = self.keys.issue(user.id, &user.email)?;
        Ok(AuthSession { token, user })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn service(store: &InMemoryStore) -> AuthService {
        AuthService::new(
            Arc::new(store.clone()),
            TokenKeys::new("unit-test-secret", 86_400),
            4,
        )
    }

    #[tokio::test]
    async fn test_register_then_login_yields_same_user() {
        let store = InMemoryStore::new();
        let auth = service(&store);

        let registered = auth.register("Asha", "asha@example.com", "pw-123").await.unwrap();
        let logged_in = auth.login("asha@example.com", "pw-123").await.unwrap();

        assert_eq!(registered.user, logged_in.user);
        let claims = auth.verify(Some(&logged_in.token)).unwrap();
        assert_eq!(claims.id, registered.user.id);
        assert_eq!(claims.email, "asha@example.com");
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let store = InMemoryStore::new();
        let auth = service(&store);

        let session = auth.register("Asha", "  Asha@Example.COM ", "pw").await.unwrap();
        assert_eq!(session.user.email, "asha@example.com");
        assert!(auth.login("ASHA@example.com", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let store = InMemoryStore::new();
        let auth = service(&store);

        let first = auth.register("Asha", "asha@example.com", "first").await.unwrap();
        let second = auth.register("Impostor", "asha@example.com", "second").await;
        assert!(matches!(second, Err(AuthError::DuplicateEmail)));

        // original account still logs in with its own password
        let again = auth.login("asha@example.com", "first").await.unwrap();
        assert_eq!(again.user, first.user);
        assert!(matches!(
            auth.login("asha@example.com", "second").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_look_identical() {
        let store = InMemoryStore::new();
        let auth = service(&store);
        auth.register("Asha", "asha@example.com", "right").await.unwrap();

        let unknown = auth.login("nobody@example.com", "right").await.unwrap_err();
        let wrong = auth.login("asha@example.com", "wrong").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let store = InMemoryStore::new();
        let auth = service(&store);

        assert!(matches!(auth.register(" ", "a@b.c", "pw").await, Err(AuthError::Validation(_))));
        assert!(matches!(
            auth.register("A", "not-an-email", "pw").await,
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(auth.register("A", "a@b.c", "").await, Err(AuthError::Validation(_))));
    }

    #[test]
    fn test_verify_distinguishes_missing_from_invalid() {
        let store = InMemoryStore::new();
        let auth = service(&store);

        assert!(matches!(auth.verify(None), Err(AuthError::MissingToken)));
        assert!(matches!(auth.verify(Some("")), Err(AuthError::MissingToken)));
        assert!(matches!(auth.verify(Some("garbage")), Err(AuthError::InvalidToken)));
    }
}
