//! SheetFAQ — Telegram FAQ bot backed by spreadsheet CSV exports.
//!
//! Loads question/answer rows from remote sheets at startup and answers
//! chat messages by exact, keyword, or fuzzy match.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
