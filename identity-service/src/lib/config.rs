use std::env;

use auth::HashingCost;
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
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
    #[serde(default)]
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub min_length: usize,
}

impl PasswordConfig {
    pub fn hashing_cost(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashingCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
            min_length: 6,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// A `.env` file in the working directory, if present, is read into the
    /// process environment first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot safely start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < auth::SigningKey::MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                auth::SigningKey::MIN_SECRET_LENGTH
            )));
        }

        if !(1..=auth::TokenIssuer::MAX_TTL_SECONDS).contains(&self.jwt.ttl_seconds) {
            return Err(ConfigError::Message(format!(
                "jwt.ttl_seconds must be between 1 and {}",
                auth::TokenIssuer::MAX_TTL_SECONDS
            )));
        }

        if self.password.min_length == 0 {
            return Err(ConfigError::Message(
                "password.min_length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "postgres://localhost/identity".to_string(),
                max_connections: 5,
            },
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
                ttl_seconds: 3600,
                issuer: None,
            },
            password: PasswordConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = config();
        config.jwt.secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let mut config = config();
        config.jwt.ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_ttl_rejected() {
        let mut config = config();
        config.jwt.ttl_seconds = i64::MAX;
        assert!(config.validate().is_err());

        config.jwt.ttl_seconds = auth::TokenIssuer::MAX_TTL_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserializes_from_sources() {
        let configuration = ConfigBuilder::builder()
            .set_override("database.url", "postgres://db/identity")
            .unwrap()
            .set_override("server.http_port", 9000)
            .unwrap()
            .set_override("jwt.secret", "test-secret-key-for-jwt-signing-at-least-32-bytes")
            .unwrap()
            .set_override("jwt.ttl_seconds", 600)
            .unwrap()
            .build()
            .unwrap();

        let config: Config = configuration.try_deserialize().unwrap();

        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.jwt.ttl_seconds, 600);
        assert_eq!(config.password.min_length, 6);
        assert!(config.jwt.issuer.is_none());
    }
}
