use railbook_shared::Masked;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Masked<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Masked<String>,
    pub jwt_expiration_seconds: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

/// An empty origin list allows any origin.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_max_connections() -> u32 { 10 }
fn default_acquire_timeout() -> u64 { 3 }
fn default_bcrypt_cost() -> u32 { 10 }
fn default_true() -> bool { true }

/// Work factors bcrypt accepts.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // RAILBOOK_AUTH__JWT_SECRET=... overrides auth.jwt_secret
            .add_source(
                config::Environment::with_prefix("RAILBOOK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would only fail later, on the first request that uses them.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !BCRYPT_COST_RANGE.contains(&self.auth.bcrypt_cost) {
            return Err(config::ConfigError::Message(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                self.auth.bcrypt_cost
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    const DEFAULT_TOML: &str = include_str!("../../config/default.toml");

    fn parse(sources: &[&str]) -> Config {
        let mut builder = config::Config::builder();
        for source in sources {
            builder = builder.add_source(File::from_str(source, FileFormat::Toml));
        }
        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn test_default_file_parses() {
        let config = parse(&[DEFAULT_TOML]);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.auth.jwt_expiration_seconds, 86_400);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert_eq!(config.database.max_connections, 10);
        assert!(config.database.run_migrations);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173".to_string()]);
    }

    #[test]
    fn test_later_sources_override() {
        let config = parse(&[
            DEFAULT_TOML,
            "[server]\nport = 8080\n[auth]\njwt_secret = \"prod\"\njwt_expiration_seconds = 60\n",
        ]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret.expose(), "prod");
        assert_eq!(config.auth.jwt_expiration_seconds, 60);
    }

    #[test]
    fn test_secrets_are_masked_in_debug() {
        let config = parse(&[DEFAULT_TOML]);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("change-me-in-production"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn test_bcrypt_cost_outside_supported_range_is_rejected() {
        for cost in [0, 3, 32] {
            let auth = format!("[auth]\nbcrypt_cost = {}\n", cost);
            let config = parse(&[DEFAULT_TOML, auth.as_str()]);
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("auth.bcrypt_cost"), "{}", err);
        }
        for cost in [4, 10, 31] {
            let auth = format!("[auth]\nbcrypt_cost = {}\n", cost);
            let config = parse(&[DEFAULT_TOML, auth.as_str()]);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let config = parse(&[concat!(
            "[server]\nport = 1\n",
            "[database]\nurl = \"postgres://x\"\n",
            "[auth]\njwt_secret = \"s\"\njwt_expiration_seconds = 5\n",
        )]);
        assert_eq!(config.database.acquire_timeout_seconds, 3);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert!(config.cors.allowed_origins.is_empty());
    }
}
