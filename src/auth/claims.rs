/// JWT Claims structure
///
/// Payload of an access token: the registered claims this service uses
/// (RFC 7519). Never persisted; reconstructed from the signed token bytes
/// on every validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, TokenError};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer label
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for a token minted now, expiring `ttl_seconds` from
    /// now.
    pub fn new(user_id: Uuid, issuer: String, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer,
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Parse the subject back into the identity-key type.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_issuer() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "perch".to_string(), 3600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "perch");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn user_id_roundtrips() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "perch".to_string(), 3600);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn non_uuid_subject_is_malformed() {
        let mut claims = Claims::new(Uuid::new_v4(), "perch".to_string(), 3600);
        claims.sub = "not-a-uuid".to_string();

        assert_eq!(
            claims.user_id().unwrap_err(),
            AppError::Token(TokenError::Malformed)
        );
    }
}
