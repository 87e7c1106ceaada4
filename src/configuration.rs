use base64::Engine;

use crate::error::{AppError, ConfigError};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    /// Deployment platform label; destructive admin operations are only
    /// allowed when this is "dev".
    pub platform: String,
}

impl ApplicationSettings {
    pub fn is_dev(&self) -> bool {
        self.platform == "dev"
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Authentication settings as they appear in the configuration file.
///
/// The signing secret is standard base64. It is decoded exactly once, at
/// load time, into [`AuthConfig`]; a raw (non-base64) secret is rejected
/// rather than silently accepted.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub access_token_ttl_seconds: i64,  // e.g. 3600 for 1 hour
    pub refresh_token_ttl_seconds: i64, // e.g. 5184000 for 60 days
    pub issuer: String,
}

/// Validated, ready-to-use authentication configuration.
///
/// Immutable after startup; shared read-only across workers.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub issuer: String,
}

impl AuthSettings {
    /// Decode and validate the settings. Any failure here is fatal at
    /// startup; nothing in this struct is re-checked per request.
    pub fn decode(&self) -> Result<AuthConfig, AppError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingRequired("auth.secret".to_string()).into());
        }

        let secret = base64::engine::general_purpose::STANDARD
            .decode(&self.secret)
            .map_err(|e| {
                ConfigError::InvalidValue(format!("auth.secret is not valid base64: {}", e))
            })?;

        if secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth.secret decodes to zero bytes".to_string(),
            )
            .into());
        }

        if self.access_token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.access_token_ttl_seconds must be positive".to_string(),
            )
            .into());
        }

        if self.refresh_token_ttl_seconds <= self.access_token_ttl_seconds {
            return Err(ConfigError::InvalidValue(
                "auth.refresh_token_ttl_seconds must exceed the access token TTL".to_string(),
            )
            .into());
        }

        Ok(AuthConfig {
            secret,
            access_token_ttl_seconds: self.access_token_ttl_seconds,
            refresh_token_ttl_seconds: self.refresh_token_ttl_seconds,
            issuer: self.issuer.clone(),
        })
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> AuthSettings {
        AuthSettings {
            // 64 random bytes, base64-encoded
            secret: "hiT6/qkbcpGn8LokB7qLxgNDADBn1IvjBtB2W7iMd84vXebR8Vd2TGDs2NURfVebJISiBsE16txLRV8xt9GnSQ=="
                .to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_seconds: 5_184_000,
            issuer: "perch".to_string(),
        }
    }

    #[test]
    fn valid_settings_decode() {
        let config = valid_settings().decode().expect("settings should decode");
        assert_eq!(config.secret.len(), 64);
        assert_eq!(config.issuer, "perch");
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut settings = valid_settings();
        settings.secret = String::new();
        assert!(settings.decode().is_err());
    }

    #[test]
    fn raw_non_base64_secret_is_rejected() {
        let mut settings = valid_settings();
        settings.secret = "this is not base64!!".to_string();
        assert!(settings.decode().is_err());
    }

    #[test]
    fn non_positive_access_ttl_is_rejected() {
        let mut settings = valid_settings();
        settings.access_token_ttl_seconds = 0;
        assert!(settings.decode().is_err());
    }

    #[test]
    fn refresh_ttl_must_exceed_access_ttl() {
        let mut settings = valid_settings();
        settings.refresh_token_ttl_seconds = settings.access_token_ttl_seconds;
        assert!(settings.decode().is_err());
    }
}
