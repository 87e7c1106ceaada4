/// Session orchestration
///
/// Ties the auth primitives together for the user-facing operations:
/// login, refresh, revoke, and access-token validation. All state is
/// injected at construction; there are no process-wide globals.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{
    extract_bearer_token, mint_access_token, validate_access_token, verify_password,
    RefreshTokenStore,
};
use crate::configuration::AuthConfig;
use crate::error::AppError;
use crate::users::{UserDirectory, UserRecord};

/// Result of a successful login.
#[derive(Debug)]
pub struct SessionTokens {
    pub user: UserRecord,
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionService {
    config: AuthConfig,
    users: Arc<dyn UserDirectory>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl SessionService {
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserDirectory>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            config,
            users,
            refresh_tokens,
        }
    }

    /// Verify credentials, then mint an access token and issue a refresh
    /// token.
    ///
    /// An unknown email and a wrong password return the identical error
    /// value; nothing distinguishes the two to a caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::Authentication)?;

        // bcrypt is CPU-bound on purpose; keep it off the async workers.
        let candidate = password.to_owned();
        let stored_hash = user.password_hash.clone();
        tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))??;

        let access_token = mint_access_token(user.id, &self.config)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(SessionTokens {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token (carried in a bearer header) for a fresh
    /// access token. The refresh token itself is not rotated or
    /// reissued.
    pub async fn refresh(&self, bearer_header: Option<&str>) -> Result<String, AppError> {
        let token = extract_bearer_token(bearer_header)?;
        let user_id = self.refresh_tokens.validate(token).await?;
        mint_access_token(user_id, &self.config)
    }

    /// Revoke the refresh token carried in a bearer header. Succeeds
    /// whenever the header parses, whether or not the token exists.
    pub async fn revoke(&self, bearer_header: Option<&str>) -> Result<(), AppError> {
        let token = extract_bearer_token(bearer_header)?;
        self.refresh_tokens.revoke(token).await
    }

    /// Validate an access token for a protected endpoint.
    pub fn validate_access(&self, token: &str) -> Result<Uuid, AppError> {
        validate_access_token(token, &self.config)
    }
}
