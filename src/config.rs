use std::env;

use thiserror::Error;

/// Runtime configuration, read once at startup.
///
/// The signing secret has no fallback: a missing or empty `JWT_SECRET`
/// is a startup error, never a silently-used default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub max_connections: u32,
    pub max_page_size: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // The page-size cap is a clamp upper bound downstream and must be
        // at least 1.
        let max_page_size = parse_or("MAX_PAGE_SIZE", 100)?;
        if max_page_size < 1 {
            return Err(ConfigError::Invalid("MAX_PAGE_SIZE"));
        }

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            port: parse_or("PORT", 3000)?,
            jwt_expiry_hours: parse_or("JWT_EXPIRY_HOURS", 24)?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 25)?,
            max_page_size,
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env manipulation is process-global, so everything lives in one test.
    #[test]
    fn from_env_requires_secret_and_applies_defaults() {
        env::set_var("DATABASE_URL", "postgres://localhost/lostfound");
        env::set_var("JWT_SECRET", "test-secret");
        env::remove_var("PORT");
        env::remove_var("JWT_EXPIRY_HOURS");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
        env::remove_var("MAX_PAGE_SIZE");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.max_page_size, 100);

        env::set_var("JWT_SECRET", "   ");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));

        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Invalid("PORT"))
        ));
        env::remove_var("PORT");

        env::set_var("MAX_PAGE_SIZE", "0");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Invalid("MAX_PAGE_SIZE"))
        ));
        env::remove_var("MAX_PAGE_SIZE");
    }
}
