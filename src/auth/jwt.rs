/// Access Token Minting and Validation
///
/// Short-lived stateless session tokens: HS256-signed JWTs over the
/// decoded signing secret. Validation is a pure function of
/// (token, secret, current time) with no I/O and no shared mutable state,
/// so it is safe to call concurrently without locking.
///
/// Statelessness means an access token cannot be individually revoked
/// before expiry; that is compensated by a short TTL relative to the
/// refresh token's.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthConfig;
use crate::error::{AppError, TokenError};

/// Mint a new access token for a user
///
/// # Errors
/// Returns an internal error if signing fails; the secret and TTL are
/// validated at configuration load, not here.
pub fn mint_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AppError> {
    let claims = Claims::new(user_id, config.issuer.clone(), config.access_token_ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(&config.secret),
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Validate an access token and return the user it was minted for.
///
/// Checks, in effect: signature, expiry (zero leeway), issuer, and that
/// the subject parses as a UUID. The failure kind is surfaced for
/// diagnostics; the HTTP layer collapses all kinds to one 401.
pub fn validate_access_token(token: &str, config: &AuthConfig) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // An expired token must fail immediately, not after a grace window.
    validation.leeway = 0;
    validation.set_issuer(&[&config.issuer]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&config.secret), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })?;

    data.claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::AuthSettings;

    const SECRET: &str =
        "hiT6/qkbcpGn8LokB7qLxgNDADBn1IvjBtB2W7iMd84vXebR8Vd2TGDs2NURfVebJISiBsE16txLRV8xt9GnSQ==";

    fn test_config(access_ttl: i64) -> AuthConfig {
        AuthSettings {
            secret: SECRET.to_string(),
            access_token_ttl_seconds: access_ttl,
            refresh_token_ttl_seconds: 5_184_000,
            issuer: "perch".to_string(),
        }
        .decode()
        .expect("test settings should decode")
    }

    #[test]
    fn mint_then_validate_returns_the_same_user() {
        let config = test_config(3600);
        let user_id: Uuid = "11111111-1111-1111-1111-111111111111".parse().unwrap();

        let token = mint_access_token(user_id, &config).expect("Failed to mint token");
        let validated = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(validated, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config(1);
        let token = mint_access_token(Uuid::new_v4(), &config).expect("Failed to mint token");

        std::thread::sleep(std::time::Duration::from_secs(3));

        assert_eq!(
            validate_access_token(&token, &config).unwrap_err(),
            AppError::Token(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config(3600);
        let token = mint_access_token(Uuid::new_v4(), &config).expect("Failed to mint token");

        let mut other = test_config(3600);
        other.secret = vec![0x42; 64];

        assert_eq!(
            validate_access_token(&token, &other).unwrap_err(),
            AppError::Token(TokenError::BadSignature)
        );
    }

    #[test]
    fn garbage_token_is_malformed() {
        let config = test_config(3600);

        assert_eq!(
            validate_access_token("not.a.token", &config).unwrap_err(),
            AppError::Token(TokenError::Malformed)
        );
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = test_config(3600);
        let token = mint_access_token(Uuid::new_v4(), &config).expect("Failed to mint token");

        let mut other = test_config(3600);
        other.issuer = "somebody-else".to_string();

        assert!(validate_access_token(&token, &other).is_err());
    }
}
