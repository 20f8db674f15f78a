//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `XCART_CURRENCY` - ISO 4217 code for orders and payments (default: INR)
//! - `XCART_MERCHANT_NAME` - Name shown in the payment widget (default: XCart)
//! - `XCART_CHANNEL_BUFFER` - Actor mailbox capacity (default: 32)
//! - `XCART_DATA_DIR` - Directory for local JSON snapshots. In-memory when unset.

use crate::model::CurrencyCode;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_MERCHANT_NAME: &str = "XCart";
const DEFAULT_CHANNEL_BUFFER: &str = "32";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    pub currency: CurrencyCode,
    pub merchant_name: String,
    /// Mailbox capacity of every aggregate actor
    pub channel_buffer: usize,
    pub data_dir: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            merchant_name: DEFAULT_MERCHANT_NAME.to_string(),
            channel_buffer: 32,
            data_dir: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let currency = get_env_or_default(&vars, "XCART_CURRENCY", CurrencyCode::default().as_str())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("XCART_CURRENCY".to_string(), e.to_string()))?;

        let merchant_name = get_env_or_default(&vars, "XCART_MERCHANT_NAME", DEFAULT_MERCHANT_NAME);

        let channel_buffer =
            get_env_or_default(&vars, "XCART_CHANNEL_BUFFER", DEFAULT_CHANNEL_BUFFER)
                .parse::<usize>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("XCART_CHANNEL_BUFFER".to_string(), e.to_string())
                })?;
        if channel_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "XCART_CHANNEL_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let data_dir = get_optional_env(&vars, "XCART_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            currency,
            merchant_name,
            channel_buffer,
            data_dir,
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

fn get_optional_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key)
}

/// Get an environment variable with a default value.
fn get_env_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    vars(key).unwrap_or_else(|| default.to_string())
}
