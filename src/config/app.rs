//! Application configuration loading from config.toml
//!
//! Every section is optional; anything missing falls back to a default so the
//! service can start with no file at all. A few values can be overridden from the
//! environment (`PORT`, `FRONTEND_URL`) to match how the service is usually deployed.
//! The token signing secret is deliberately not part of this struct: it is read
//! from `JWT_SECRET` directly before use.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings
    pub server: ServerConfig,
    /// Token lifetime
    pub auth: AuthConfig,
    /// Allowed browser origins
    pub cors: CorsConfig,
    /// Presentation of money
    pub ledger: LedgerConfig,
    /// Administrator created on first start, if configured
    pub admin: Option<AdminBootstrap>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:5000`
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Token issuance configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Hours a bearer token stays valid
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_ttl_hours: 24 }
    }
}

/// Cross-origin configuration for the single-page frontend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,
}

/// Ledger presentation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Currency label used in activity messages
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: "RWF".to_string(),
        }
    }
}

/// Administrator account seeded on start-up when no user with that email exists
#[derive(Debug, Clone, Deserialize)]
pub struct AdminBootstrap {
    /// Login email
    pub email: String,
    /// Initial password, hashed before storage
    pub password: String,
    /// Given name
    #[serde(default = "default_admin_first_name")]
    pub first_name: String,
    /// Family name
    #[serde(default = "default_admin_last_name")]
    pub last_name: String,
}

fn default_admin_first_name() -> String {
    "Family".to_string()
}

fn default_admin_last_name() -> String {
    "Admin".to_string()
}

impl AppConfig {
    /// Applies `PORT` and `FRONTEND_URL` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            let host = self
                .server
                .bind_address
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host)
                .to_string();
            self.server.bind_address = format!("{host}:{port}");
        }
        if let Ok(origins) = std::env::var("FRONTEND_URL") {
            self.cors.allowed_origins = parse_origins(&origins);
        }
        self
    }
}

/// Splits a comma-separated origin list, dropping blanks.
#[must_use]
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration.
///
/// Reads the file named by `FAMILY_FUND_CONFIG` (default `./config.toml`). A missing
/// file yields the defaults; an unreadable or malformed one is an error.
pub fn load_app_config() -> Result<AppConfig> {
    let path =
        std::env::var("FAMILY_FUND_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = if Path::new(&path).exists() {
        debug!("Loading configuration from {}", path);
        load_config(&path)?
    } else {
        info!("No configuration file at {}, using defaults", path);
        AppConfig::default()
    };

    Ok(config.with_env_overrides())
}
