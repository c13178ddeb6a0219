//! Application configuration for SheetFAQ.
//!
//! User config lives at `~/.sheetfaq/sheetfaq.toml`. Every section has
//! serde defaults so a missing file or a partial file still yields a
//! runnable configuration (minus source URLs, which have no sane default).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetFaqError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sheetfaq.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sheetfaq";

// ---------------------------------------------------------------------------
// Config structs (matching sheetfaq.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Spreadsheet CSV sources.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Matching thresholds and limits.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// User-visible reply strings.
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// `[telegram]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Name of the env var holding the bot token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Long-poll timeout for getUpdates, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_token_env() -> String {
    "SHEETFAQ_TELEGRAM_TOKEN".into()
}
fn default_poll_timeout() -> u64 {
    50
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// CSV export URLs, fetched in order at startup. Later sources
    /// overwrite earlier ones on duplicate questions.
    #[serde(default)]
    pub urls: Vec<String>,

    /// HTTP timeout per source fetch, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

/// `[matching]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum token-sort similarity (0.0 to 1.0) for the fuzzy tier to
    /// accept its best candidate. The score must strictly exceed this.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Query tokens must be strictly longer than this to qualify for
    /// keyword matching.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,

    /// Maximum number of (question, answer) pairs in a keyword-match reply.
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            min_token_len: default_min_token_len(),
            keyword_limit: default_keyword_limit(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.70
}
fn default_min_token_len() -> usize {
    2
}
fn default_keyword_limit() -> usize {
    5
}

/// `[messages]` section. Defaults match the original bot's Arabic copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Reply to `/start` and other commands.
    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// Header line above a multi-match listing.
    #[serde(default = "default_multi_match_header")]
    pub multi_match_header: String,

    /// Label prefixing each matched question in a listing.
    #[serde(default = "default_question_label")]
    pub question_label: String,

    /// Label prefixing each answer in a listing.
    #[serde(default = "default_answer_label")]
    pub answer_label: String,

    /// Reply when no tier produced a match.
    #[serde(default = "default_no_answer")]
    pub no_answer: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            multi_match_header: default_multi_match_header(),
            question_label: default_question_label(),
            answer_label: default_answer_label(),
            no_answer: default_no_answer(),
        }
    }
}

fn default_welcome() -> String {
    "👋 مرحبًا! اسألني أي سؤال من الجداول المتاحة!".into()
}
fn default_multi_match_header() -> String {
    "🔎 وجدت أكثر من إجابة محتملة:".into()
}
fn default_question_label() -> String {
    "السؤال".into()
}
fn default_answer_label() -> String {
    "الإجابة".into()
}
fn default_no_answer() -> String {
    "عذرًا، لا أجد إجابة لهذا السؤال.".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sheetfaq/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SheetFaqError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sheetfaq/sheetfaq.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SheetFaqError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SheetFaqError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SheetFaqError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SheetFaqError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SheetFaqError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the bot token from the env var named in config.
///
/// The token never appears in the config file or in source; the original
/// implementation hard-coded it, which this deliberately does not preserve.
pub fn resolve_bot_token(config: &AppConfig) -> Result<String> {
    let var_name = &config.telegram.token_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(SheetFaqError::config(format!(
            "Telegram bot token not found. Set the {var_name} environment variable \
             to the token BotFather gave you."
        ))),
    }
}
