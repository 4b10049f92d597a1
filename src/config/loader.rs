//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml
//! structure. Secrets can be supplied through environment variables
//! instead of the file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::gate::{GLOBAL_COOLDOWN_SECS, PER_ADDRESS_COOLDOWN_SECS};
use crate::domain::postings::DEFAULT_POSTING_LOG_FILE;
use crate::domain::roster::DEFAULT_ROSTER_FILE;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub solana: SolanaSection,
    pub telegram: TelegramSection,
    #[serde(default)]
    pub watcher: WatcherSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint; must support the DAS getAsset extension
    pub rpc_url: String,
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }
}

/// Telegram configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSection {
    /// Bot token (prefer the BOT_TOKEN env var over committing this)
    #[serde(default)]
    pub bot_token: String,
    /// Chats notifications are delivered to
    pub notify_chat_ids: Vec<i64>,
    /// The bot's own notification chat, excluded from watching
    #[serde(default)]
    pub own_chat_id: Option<i64>,
}

impl TelegramSection {
    /// Get bot token with environment variable override
    pub fn get_bot_token(&self) -> String {
        std::env::var("BOT_TOKEN").unwrap_or_else(|_| self.bot_token.clone())
    }

    /// Get the excluded chat id, overridable via OWN_CHAT_ID
    pub fn get_own_chat_id(&self) -> Option<i64> {
        std::env::var("OWN_CHAT_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(self.own_chat_id)
    }
}

/// Watcher timing configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherSection {
    /// Cooldown between notifications for the same address, in seconds
    pub per_address_cooldown_secs: i64,
    /// Cooldown between any two notifications, in seconds
    pub global_cooldown_secs: i64,
    /// Timeout for each metadata source call, in seconds
    pub source_timeout_secs: u64,
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            per_address_cooldown_secs: PER_ADDRESS_COOLDOWN_SECS,
            global_cooldown_secs: GLOBAL_COOLDOWN_SECS,
            source_timeout_secs: 20,
        }
    }
}

/// Storage paths configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Address roster file
    pub roster_file: String,
    /// Posting log file backing the notification cooldowns
    pub posting_log_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            roster_file: DEFAULT_ROSTER_FILE.to_string(),
            posting_log_file: DEFAULT_POSTING_LOG_FILE.to_string(),
        }
    }
}

impl StorageSection {
    pub fn roster_path(&self) -> String {
        shellexpand::tilde(&self.roster_file).to_string()
    }

    pub fn posting_log_path(&self) -> String {
        shellexpand::tilde(&self.posting_log_file).to_string()
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana.get_rpc_url().is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if self.telegram.get_bot_token().is_empty() {
            return Err(ConfigError::ValidationError(
                "bot_token cannot be empty (set it in config.toml or BOT_TOKEN)".to_string(),
            ));
        }

        if self.telegram.notify_chat_ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "notify_chat_ids cannot be empty".to_string(),
            ));
        }

        if self.watcher.per_address_cooldown_secs <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "per_address_cooldown_secs must be > 0, got {}",
                self.watcher.per_address_cooldown_secs
            )));
        }

        if self.watcher.global_cooldown_secs <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "global_cooldown_secs must be > 0, got {}",
                self.watcher.global_cooldown_secs
            )));
        }

        if self.watcher.source_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "source_timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[solana]
rpc_url = "https://api.mainnet-beta.solana.com"

[telegram]
bot_token = "123456:test-token"
notify_chat_ids = [-1001234567890]
own_chat_id = -1001234567890

[watcher]
per_address_cooldown_secs = 180
global_cooldown_secs = 60
source_timeout_secs = 20

[storage]
roster_file = "addresses.json"
posting_log_file = "messages.json"

[logging]
level = "info"
"#
        .to_string()
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.solana.rpc_url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.telegram.notify_chat_ids, vec![-1001234567890]);
        assert_eq!(config.watcher.per_address_cooldown_secs, 180);
        assert_eq!(config.storage.roster_file, "addresses.json");
    }

    #[test]
    fn test_optional_sections_default() {
        let minimal = r#"
[solana]
rpc_url = "https://api.mainnet-beta.solana.com"

[telegram]
bot_token = "123456:test-token"
notify_chat_ids = [42]
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(minimal.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.watcher.per_address_cooldown_secs, 180);
        assert_eq!(config.watcher.global_cooldown_secs, 60);
        assert_eq!(config.storage.posting_log_file, "messages.json");
        assert_eq!(config.logging.level, "info");
        assert!(config.telegram.own_chat_id.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_empty_notify_chat_ids_rejected() {
        let invalid = r#"
[solana]
rpc_url = "https://api.mainnet-beta.solana.com"

[telegram]
bot_token = "123456:test-token"
notify_chat_ids = []
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(invalid.as_bytes()).unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let invalid = r#"
[solana]
rpc_url = "https://api.mainnet-beta.solana.com"

[telegram]
bot_token = "123456:test-token"
notify_chat_ids = [42]

[watcher]
per_address_cooldown_secs = 0
global_cooldown_secs = 60
source_timeout_secs = 20
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(invalid.as_bytes()).unwrap();

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_tilde_expansion() {
        let storage = StorageSection {
            roster_file: "~/data/addresses.json".to_string(),
            posting_log_file: "messages.json".to_string(),
        };
        assert!(!storage.roster_path().starts_with('~'));
        assert_eq!(storage.posting_log_path(), "messages.json");
    }
}
