//! Habit Coach - Entry Point
//!
//! Modes:
//! - Default: Telegram bot
//! - --check-config: print resolved configuration and exit

use habit_coach::config::{self, Config};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");
    let check_mode = args.iter().any(|a| a == "--check-config");
    let json_logs = args.iter().any(|a| a == "--json-logs");

    if help_mode {
        println!("Habit Coach v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: habit-coach [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --check-config     Print resolved configuration and exit");
        println!("  --json-logs        Log as JSON instead of colored text");
        println!("  --help, -h         Show this help");
        println!();
        println!("Environment variables:");
        println!("  TELEGRAM_BOT_TOKEN       Telegram bot token (required)");
        println!("  MISTRAL_API_KEY          Mistral API key (feedback falls back without it)");
        println!("  TELEGRAM_ALLOWED_USERS   Comma-separated user IDs (default: everyone)");
        println!("  HABIT_STORE              json | sqlite | memory (default: json)");
        println!("  HABIT_DATA_FILE          JSON store path (default: tracker_data.json)");
        println!("  HABIT_DB_PATH            SQLite store path (default: tracker_data.db)");
        println!("  COACH_ATHLETE_NAME       Name the coach uses (default: Артём)");
        println!("  CHALLENGE_DAYS           Challenge length (default: 15)");
        return Ok(());
    }

    let log_filter = config::log_filter(std::env::var("RUST_LOG").ok().as_deref());

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(log_filter)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(log_filter)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config = Config::from_env()?;

    if check_mode {
        println!("{}", config.describe());
        return Ok(());
    }

    info!("Habit Coach Telegram Bot v{}", env!("CARGO_PKG_VERSION"));

    habit_coach::telegram::run_telegram_bot(config).await?;

    Ok(())
}
