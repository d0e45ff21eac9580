use crate::core::{AppError, Currency, Result};
use crate::modules::debts::services::MAX_UPCOMING_PAGE;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// "text" or "json"
    pub log_format: String,
}

/// Money and scheduling rules for the ledger
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub currency: Currency,
    pub max_tenor: i32,
    pub upcoming_debts_limit: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origin: Option<String>,
    /// Seconds a verified API key stays cached before it is re-checked
    pub session_ttl_secs: u64,
    /// Seed user created at startup when both name and key are set
    pub bootstrap_user: Option<String>,
    pub bootstrap_api_key: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: Currency::IDR,
            max_tenor: 60,
            upcoming_debts_limit: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            ledger: LedgerConfig {
                currency: env::var("APP_CURRENCY")
                    .unwrap_or_else(|_| "IDR".to_string())
                    .parse()
                    .map_err(AppError::Configuration)?,
                max_tenor: parse_var("MAX_TENOR", "60")?,
                upcoming_debts_limit: parse_var("UPCOMING_DEBTS_LIMIT", "5")?,
            },
            security: SecurityConfig {
                rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", "600")?,
                cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
                session_ttl_secs: parse_var("AUTH_SESSION_TTL_SECS", "300")?,
                bootstrap_user: env::var("BOOTSTRAP_USER").ok(),
                bootstrap_api_key: env::var("BOOTSTRAP_API_KEY").ok(),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ledger.max_tenor < 1 {
            return Err(AppError::Configuration(
                "MAX_TENOR must be at least 1".to_string(),
            ));
        }

        if !(1..=MAX_UPCOMING_PAGE).contains(&self.ledger.upcoming_debts_limit) {
            return Err(AppError::Configuration(format!(
                "UPCOMING_DEBTS_LIMIT must be between 1 and {}",
                MAX_UPCOMING_PAGE
            )));
        }

        if self.security.rate_limit_per_minute == 0 {
            return Err(AppError::Configuration(
                "Rate limit must be greater than 0".to_string(),
            ));
        }

        if let Some(key) = &self.security.bootstrap_api_key {
            if key.len() < 16 {
                return Err(AppError::Configuration(
                    "BOOTSTRAP_API_KEY must be at least 16 characters".to_string(),
                ));
            }
        }

        if !matches!(self.app.log_format.as_str(), "text" | "json") {
            return Err(AppError::Configuration(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.app.log_format
            )));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}
