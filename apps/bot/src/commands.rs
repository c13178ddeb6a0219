//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use sheetfaq_shared::{
    AppConfig, config_file_path, init_config, load_config, load_config_from, resolve_bot_token,
};
use sheetfaq_sheets::{SheetLoader, SourceReport};
use sheetfaq_telegram::{BotClient, run_bot};
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SheetFAQ — answer Telegram questions from spreadsheet CSV exports.
#[derive(Parser)]
#[command(
    name = "sheetfaq",
    version,
    about = "Telegram FAQ bot that answers from Google Sheets CSV exports.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (defaults to ~/.sheetfaq/sheetfaq.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load the configured sources and start answering messages.
    Run,

    /// Load the configured sources and print a per-source report, without
    /// starting the bot.
    Check,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sheetfaq=info",
        1 => "sheetfaq=debug",
        _ => "sheetfaq=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Run => cmd_run(&config).await,
        Command::Check => cmd_check(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: &AppConfig) -> Result<()> {
    // Fail on a missing token before fetching anything
    let token = resolve_bot_token(config)?;
    let urls = parse_source_urls(config)?;

    let loader = SheetLoader::new(config.sources.fetch_timeout_secs)?;
    let (table, reports) = loader.load(&urls).await;
    print_source_reports(&reports);

    if table.is_empty() {
        warn!("QA table is empty; every query will get the no-answer reply");
    }

    info!(
        entries = table.len(),
        poll_timeout = config.telegram.poll_timeout_secs,
        "starting bot"
    );

    let client = BotClient::new(&token)?;
    run_bot(
        &client,
        &table,
        &config.matching,
        &config.messages,
        config.telegram.poll_timeout_secs,
    )
    .await?;

    Ok(())
}

async fn cmd_check(config: &AppConfig) -> Result<()> {
    let urls = parse_source_urls(config)?;

    let loader = SheetLoader::new(config.sources.fetch_timeout_secs)?;
    let (table, reports) = loader.load(&urls).await;
    print_source_reports(&reports);

    println!();
    println!("  Total entries: {}", table.len());
    println!(
        "  Sources OK:    {}/{}",
        reports.iter().filter(|r| r.error.is_none()).count(),
        reports.len()
    );
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("# {}", config_file_path()?.display());
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the configured source URLs, rejecting an empty or invalid list.
fn parse_source_urls(config: &AppConfig) -> Result<Vec<Url>> {
    if config.sources.urls.is_empty() {
        return Err(eyre!(
            "no source URLs configured. Add [sources] urls to the config file \
             (run `sheetfaq config init` to create one)"
        ));
    }

    config
        .sources
        .urls
        .iter()
        .map(|raw| Url::parse(raw).map_err(|e| eyre!("invalid source URL '{raw}': {e}")))
        .collect()
}

fn print_source_reports(reports: &[SourceReport]) {
    for report in reports {
        match &report.error {
            None => println!("  OK      {} ({} rows)", report.url, report.rows),
            Some(error) => println!("  SKIPPED {} ({error})", report.url),
        }
    }
}
