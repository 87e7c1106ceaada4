/// Refresh Token Lifecycle
///
/// Long-lived opaque tokens, exchangeable for new access tokens until
/// expired or revoked. Tokens are:
/// - Cryptographically secure random 64-character strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Database-backed so revocation is possible server-side
///
/// The store is a trait so the session logic is identical over a durable
/// Postgres table or an in-process map. Rows are never deleted here;
/// clearing out expired or revoked rows is a job for external
/// maintenance.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, TokenError};

const TOKEN_LENGTH: usize = 64;

/// Generate a new refresh token value.
///
/// 64 alphanumeric characters from a CSPRNG, well over 256 bits of
/// entropy. A collision between outstanding tokens is astronomically
/// unlikely; the unique constraint on the table treats one as a bug, not
/// a retryable condition.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 of the token value, hex-encoded. The table is keyed by this.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Server-side refresh-token lifecycle: issue, validate, revoke.
///
/// Each token moves one way, Active -> Revoked; expiry is a predicate
/// evaluated at validation time, not a stored transition. A token is
/// bound to exactly one user at issuance and that binding never changes.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Generate and persist a token for the user, returning the
    /// plaintext value. If this errors, the caller must not assume the
    /// token exists.
    async fn issue(&self, user_id: Uuid) -> Result<String, AppError>;

    /// Look the token up and return its user. Read-only; fails with
    /// NotFound, Revoked, or Expired.
    async fn validate(&self, token: &str) -> Result<Uuid, AppError>;

    /// Mark the token revoked. Idempotent and non-leaking: revoking an
    /// already-revoked or unknown token still reports success, so a
    /// caller can never probe whether a token ever existed. Only storage
    /// failures error.
    async fn revoke(&self, token: &str) -> Result<(), AppError>;
}

/// Durable store backed by the `refresh_tokens` table.
pub struct PgRefreshTokenStore {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgRefreshTokenStore {
    /// The TTL is fixed configuration, injected once at construction.
    pub fn new(pool: PgPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = generate_refresh_token();
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::seconds(self.ttl_seconds);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, issued_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(issued_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Option<DateTime<Utc>>)>(
            r#"
            SELECT user_id, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Err(TokenError::NotFound.into()),
            Some((user_id, expires_at, revoked_at)) => {
                if revoked_at.is_some() {
                    tracing::warn!(user_id = %user_id, "Attempt to use revoked refresh token");
                    return Err(TokenError::Revoked.into());
                }
                if expires_at < Utc::now() {
                    tracing::info!(user_id = %user_id, "Refresh token expired");
                    return Err(TokenError::Expired.into());
                }
                Ok(user_id)
            }
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        // revoked_at, once set, is terminal; the IS NULL guard keeps a
        // racing second revoke from moving the timestamp. The affected
        // row count is deliberately ignored.
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1
            WHERE token_hash = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(hash_token(token))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

struct TokenRow {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

/// In-process store with the same lifecycle semantics, keyed the same
/// way. Backs unit tests and single-node setups that do not need
/// durability.
pub struct InMemoryRefreshTokenStore {
    ttl_seconds: i64,
    rows: std::sync::Mutex<std::collections::HashMap<String, TokenRow>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl_seconds,
            rows: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, std::collections::HashMap<String, TokenRow>> {
        // A poisoned lock means a panic mid-update; propagating the panic
        // is the only sane option for an in-process map.
        self.rows.lock().unwrap()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = generate_refresh_token();
        let issued_at = Utc::now();
        let row = TokenRow {
            user_id,
            expires_at: issued_at + Duration::seconds(self.ttl_seconds),
            revoked_at: None,
        };
        self.lock().insert(hash_token(&token), row);
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let rows = self.lock();
        match rows.get(&hash_token(token)) {
            None => Err(TokenError::NotFound.into()),
            Some(row) if row.revoked_at.is_some() => Err(TokenError::Revoked.into()),
            Some(row) if row.expires_at < Utc::now() => Err(TokenError::Expired.into()),
            Some(row) => Ok(row.user_id),
        }
    }

    async fn revoke(&self, token: &str) -> Result<(), AppError> {
        if let Some(row) = self.lock().get_mut(&hash_token(token)) {
            if row.revoked_at.is_none() {
                row.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_long_and_alphanumeric() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_alphanumeric()));
    }

    #[test]
    fn hashing_is_deterministic_and_one_way() {
        let token = generate_refresh_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), token);
        // SHA-256 hex
        assert_eq!(hash_token(&token).len(), 64);
    }

    #[tokio::test]
    async fn issue_returns_distinct_tokens() {
        let store = InMemoryRefreshTokenStore::new(3600);
        let user_id = Uuid::new_v4();

        let first = store.issue(user_id).await.unwrap();
        let second = store.issue(user_id).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn validate_returns_the_issuing_user() {
        let store = InMemoryRefreshTokenStore::new(3600);
        let user_id = Uuid::new_v4();

        let token = store.issue(user_id).await.unwrap();
        assert_eq!(store.validate(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let store = InMemoryRefreshTokenStore::new(3600);
        assert_eq!(
            store.validate("no-such-token").await.unwrap_err(),
            AppError::Token(TokenError::NotFound)
        );
    }

    #[tokio::test]
    async fn revoked_token_fails_validation_permanently() {
        let store = InMemoryRefreshTokenStore::new(3600);
        let token = store.issue(Uuid::new_v4()).await.unwrap();

        store.revoke(&token).await.unwrap();

        assert_eq!(
            store.validate(&token).await.unwrap_err(),
            AppError::Token(TokenError::Revoked)
        );
        // Still revoked on a later read
        assert_eq!(
            store.validate(&token).await.unwrap_err(),
            AppError::Token(TokenError::Revoked)
        );
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_does_not_leak_existence() {
        let store = InMemoryRefreshTokenStore::new(3600);
        let token = store.issue(Uuid::new_v4()).await.unwrap();

        store.revoke(&token).await.unwrap();
        // Second revoke of the same token: still success
        store.revoke(&token).await.unwrap();
        // Revoking a token that never existed: still success
        store.revoke("never-issued").await.unwrap();
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        // Negative TTL: every issued token is already past expiry.
        let store = InMemoryRefreshTokenStore::new(-1);
        let token = store.issue(Uuid::new_v4()).await.unwrap();

        assert_eq!(
            store.validate(&token).await.unwrap_err(),
            AppError::Token(TokenError::Expired)
        );
    }
}
