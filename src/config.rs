//! Configuration management for Shelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API with credentials (the session cookie)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub collections: CollectionNames,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionNames {
    pub books: String,
    pub categories: String,
    pub loans: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cookie_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Deployment environment, drives the session cookie attributes
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnvironment {
    #[default]
    Development,
    Production,
}

impl DeployEnvironment {
    /// Anything other than `production` counts as development
    pub fn from_flag(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            DeployEnvironment::Production
        } else {
            DeployEnvironment::Development
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeployEnvironment::Development => "development",
            DeployEnvironment::Production => "production",
        }
    }

    pub fn is_production(self) -> bool {
        self == DeployEnvironment::Production
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub environment: DeployEnvironment,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let environment = env::var("NODE_ENV")
            .ok()
            .or_else(|| env::var("RUN_MODE").ok())
            .map(|value| DeployEnvironment::from_flag(&value).as_str().to_string());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix SHELF_)
            .add_source(
                Environment::with_prefix("SHELF")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("MONGODB_URI").ok())?
            .set_override_option("database.username", env::var("DB_USER").ok())?
            .set_override_option("database.password", env::var("DB_PASS").ok())?
            .set_override_option("auth.jwt_secret", env::var("SECRET_KEY").ok())?
            .set_override_option("environment", environment)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "https://shelf-bookm.netlify.app".to_string(),
            ],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            name: "booksPortal".to_string(),
            username: None,
            password: None,
            collections: CollectionNames::default(),
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            books: "books".to_string(),
            categories: "category".to_string(),
            loans: "borrowed".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            token_ttl_days: 365,
            cookie_name: "token".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            environment: DeployEnvironment::default(),
        }
    }
}
