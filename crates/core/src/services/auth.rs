//! Authentication service.
//!
//! Ties credential verification to token issuance and resolves bearer tokens
//! back into a verified identity.

use quill_common::{AppResult, Claims, TokenService};
use quill_db::entities::user;

use crate::services::user::UserService;

/// A verified request identity: the authenticated user plus the claims of the
/// token that authenticated them.
///
/// The token expiry doubles as the reachability window when the user registers
/// a device, so the claims travel with the user.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The authenticated user.
    pub user: user::Model,
    /// Claims of the presenting token.
    pub claims: Claims,
}

/// Authentication service for login and bearer verification.
#[derive(Clone)]
pub struct AuthService {
    user_service: UserService,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(user_service: UserService, tokens: TokenService) -> Self {
        Self {
            user_service,
            tokens,
        }
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let user = self.user_service.authenticate(username, password).await?;
        self.tokens.issue(&user.username, &user.id)
    }

    /// Resolve a bearer token into a verified identity.
    pub async fn identify(&self, token: &str) -> AppResult<Identity> {
        let claims = self.tokens.verify(token)?;
        let user = self.user_service.get(&claims.uid).await?;

        if user.is_disabled {
            return Err(quill_common::AppError::Forbidden(
                "Account is disabled".to_string(),
            ));
        }

        Ok(Identity { user, claims })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::AppError;
    use quill_db::repositories::UserRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn token_service() -> TokenService {
        TokenService::new("test-secret-key-that-is-long-enough", 30)
    }

    fn user_with_id(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            full_name: "Ada Lovelace".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            is_disabled: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_identify_round_trip() {
        let user = user_with_id("65a1b2c3d4e5f60718293a4b");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let tokens = token_service();
        let token = tokens.issue("ada", &user.id).unwrap();

        let service = AuthService::new(UserService::new(UserRepository::new(db)), tokens);
        let identity = service.identify(&token).await.unwrap();

        assert_eq!(identity.user.id, user.id);
        assert_eq!(identity.claims.sub, "ada");
        assert!(identity.claims.expires_at() > Utc::now());
    }

    #[tokio::test]
    async fn test_identify_rejects_forged_token() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = AuthService::new(
            UserService::new(UserRepository::new(db)),
            token_service(),
        );

        let forged = TokenService::new("some-other-secret-key-entirely", 30)
            .issue("ada", "65a1b2c3d4e5f60718293a4b")
            .unwrap();

        let result = service.identify(&forged).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_identify_rejects_disabled_account() {
        let mut user = user_with_id("65a1b2c3d4e5f60718293a4b");
        user.is_disabled = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let tokens = token_service();
        let token = tokens.issue("ada", &user.id).unwrap();

        let service = AuthService::new(UserService::new(UserRepository::new(db)), tokens);
        let result = service.identify(&token).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
