//! Bot configuration
//!
//! Layered from an optional TOML file and `SIGNAL_BOT__*` environment
//! variables. `BOT_TOKEN` and `CHAT_ID` are read as fallbacks for the
//! Telegram credentials.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use common::{GaleSchedule, MAX_WINDOW_MINUTES};
use serde::{Deserialize, Serialize};
use signal_generation::MessageStyle;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/signal-bot.toml";

/// Overall bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// HTTP trigger surface
    pub server: ServerConfig,

    /// Telegram Bot API destination
    pub telegram: TelegramConfig,

    /// Binance REST endpoint
    pub market_data: MarketDataConfig,

    /// Where signals are kept
    pub storage: StorageConfig,

    /// Window lengths of the primary signal and the gale levels
    pub schedule: GaleSchedule,

    /// Message rendering
    pub display: DisplayConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            telegram: TelegramConfig::default(),
            market_data: MarketDataConfig::default(),
            storage: StorageConfig::default(),
            schedule: GaleSchedule::default(),
            display: DisplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_url: String,

    /// Messages are only logged when the token or chat id is missing
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: data_ingestion::telegram::DEFAULT_TELEGRAM_API_URL.to_string(),
            bot_token: None,
            chat_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.binance.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MarketDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// JSON history file, used by the `file` backend
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: PathBuf::from("./data/signals.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset from UTC in minutes used for the HH:MM windows (-180 = UTC-03:00)
    pub utc_offset_minutes: i32,
    pub broker_url: String,
    pub help_url: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let style = MessageStyle::default();
        Self {
            utc_offset_minutes: style.display_offset.local_minus_utc() / 60,
            broker_url: style.broker_url,
            help_url: style.help_url,
        }
    }
}

impl DisplayConfig {
    pub fn message_style(&self) -> Result<MessageStyle> {
        let display_offset = self
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("utc_offset_minutes {} is out of range", self.utc_offset_minutes))?;

        Ok(MessageStyle {
            display_offset,
            broker_url: self.broker_url.clone(),
            help_url: self.help_url.clone(),
        })
    }
}

/// Load configuration from `path` (if it exists) and the environment
pub fn load_config(path: &str) -> Result<BotConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("SIGNAL_BOT").separator("__"))
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path))?;

    let mut config: BotConfig = settings
        .try_deserialize()
        .context("Invalid bot configuration")?;

    apply_legacy_env(&mut config, |key| std::env::var(key).ok());

    anyhow::ensure!(
        config.schedule.is_within_bounds(),
        "schedule windows must be between 1 and {} minutes (primary {}, gale step {})",
        MAX_WINDOW_MINUTES,
        config.schedule.primary_window_minutes,
        config.schedule.gale_step_minutes
    );
    Ok(config)
}

/// Fill Telegram credentials from `BOT_TOKEN` / `CHAT_ID` when not configured
fn apply_legacy_env(config: &mut BotConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.telegram.bot_token.is_none() {
        config.telegram.bot_token = lookup("BOT_TOKEN").filter(|v| !v.is_empty());
    }
    if config.telegram.chat_id.is_none() {
        config.telegram.chat_id = lookup("CHAT_ID").filter(|v| !v.is_empty());
    }
}

/// Save configuration to TOML file
pub fn save_config(config: &BotConfig, path: &str) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = std::path::Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
