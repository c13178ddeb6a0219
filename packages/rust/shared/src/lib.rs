//! Shared types, error model, and configuration for SheetFAQ.
//!
//! This crate is the foundation depended on by all other SheetFAQ crates.
//! It provides:
//! - [`SheetFaqError`] — the unified error type
//! - The QA table and text normalization ([`QaTable`], [`normalize`])
//! - Configuration ([`AppConfig`], config loading, bot token resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, MatchingConfig, MessagesConfig, SourcesConfig, TelegramConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_bot_token,
};
pub use error::{Result, SheetFaqError};
pub use types::{QaTable, normalize};
