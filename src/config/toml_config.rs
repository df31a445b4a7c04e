use crate::core::api::DEFAULT_BASE_URL;
use crate::core::cart::OptionRates;
use crate::core::notifications::ReconnectPolicy;
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, validate_ws_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NOTIFICATIONS_URL: &str = "wss://api.auto.ru/notifications";
pub const DEFAULT_STORAGE_PATH: &str = "./.autopro";

/// Client configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pricing: OptionRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_notifications_url")]
    pub url: String,
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_true")]
    pub show_toasts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_notifications_url() -> String {
    DEFAULT_NOTIFICATIONS_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    5000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            url: default_notifications_url(),
            auto_reconnect: true,
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            show_toasts: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RentalError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| RentalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads `path` when given, otherwise falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn storage_path(&self) -> &str {
        &self.storage.path
    }

    pub fn notifications_url(&self) -> &str {
        &self.notifications.url
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            auto_reconnect: self.notifications.auto_reconnect,
            reconnect_interval: Duration::from_millis(self.notifications.reconnect_interval_ms),
            max_reconnect_attempts: self.notifications.max_reconnect_attempts,
        }
    }
}

/// Replaces `${VAR}` with the environment value; unknown variables stay as written.
pub(crate) fn substitute_env_vars(content: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| RentalError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_positive_number("api.timeout_seconds", self.api.timeout_seconds, 1)?;

        validate_ws_url("notifications.url", &self.notifications.url)?;
        validate_positive_number(
            "notifications.reconnect_interval_ms",
            self.notifications.reconnect_interval_ms,
            1,
        )?;

        validate_path("storage.path", &self.storage.path)?;

        let rates = [
            ("pricing.full_insurance", self.pricing.full_insurance),
            ("pricing.child_seat", self.pricing.child_seat),
            ("pricing.gps", self.pricing.gps),
            ("pricing.additional_driver", self.pricing.additional_driver),
        ];
        for (field, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(RentalError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: rate.to_string(),
                    reason: "Rate must be a non-negative amount".to_string(),
                });
            }
        }
        validate_range(
            "notifications.max_reconnect_attempts",
            self.notifications.max_reconnect_attempts,
            0,
            100,
        )?;

        Ok(())
    }
}
