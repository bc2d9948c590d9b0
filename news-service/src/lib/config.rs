use std::env;

use auth::TokenCodec;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_seconds: i64,
}

impl JwtConfig {
    /// Reject a signing secret shorter than [`TokenCodec::MIN_SECRET_LENGTH`] bytes
    /// or a token lifetime outside `1..=`[`TokenCodec::MAX_TTL_SECONDS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < TokenCodec::MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                TokenCodec::MIN_SECRET_LENGTH,
                self.secret.len()
            )));
        }

        if !(1..=TokenCodec::MAX_TTL_SECONDS).contains(&self.expiration_seconds) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_seconds must be between 1 and {}, got {}",
                TokenCodec::MAX_TTL_SECONDS,
                self.expiration_seconds
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// There is no default signing secret: startup fails until one is provided.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str, expiration_seconds: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_seconds,
        }
    }

    #[test]
    fn test_valid_jwt_config() {
        assert!(jwt(&"k".repeat(32), 86_400).validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        assert!(jwt("", 86_400).validate().is_err());
        assert!(jwt("too-short", 86_400).validate().is_err());
    }

    #[test]
    fn test_non_positive_lifetime_is_rejected() {
        let secret = "k".repeat(64);
        assert!(jwt(&secret, 0).validate().is_err());
        assert!(jwt(&secret, -60).validate().is_err());
    }

    #[test]
    fn test_oversized_lifetime_is_rejected() {
        let secret = "k".repeat(64);
        assert!(jwt(&secret, TokenCodec::MAX_TTL_SECONDS).validate().is_ok());
        assert!(jwt(&secret, TokenCodec::MAX_TTL_SECONDS + 1).validate().is_err());
        assert!(jwt(&secret, i64::MAX).validate().is_err());
    }
}
