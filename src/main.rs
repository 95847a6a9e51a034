use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nutribot::assistant::OpenAiAssistant;
use nutribot::bot::{dispatch, BotContext, Command};
use nutribot::config::BotConfig;
use nutribot::ledger::{GoogleSheetsLedger, ServiceAccountKey};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Nutribot");

    let config = BotConfig::from_env().context("Failed to load configuration")?;
    if config.access.is_empty() {
        warn!("AUTHORIZED_USER_IDS is empty, every user will be denied");
    }
    info!(
        authorized_users = config.access.len(),
        nutrition_fields = ?config.nutrition_fields.keys(),
        "Configuration loaded"
    );

    let key = ServiceAccountKey::from_file(&config.ledger.credentials_path).with_context(|| {
        format!(
            "Failed to load Google credentials from {}",
            config.ledger.credentials_path.display()
        )
    })?;
    let ledger = GoogleSheetsLedger::new(key, config.ledger.clone())
        .context("Failed to initialize the spreadsheet ledger")?;
    let assistant = OpenAiAssistant::new(config.assistant.clone());

    let context = Arc::new(BotContext::new(
        config.access.clone(),
        Arc::new(assistant),
        Arc::new(ledger),
        config.nutrition_fields.clone(),
    ));

    // Initialize the bot
    let bot = Bot::new(config.telegram_token.clone());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, dispatch::schema())
        .dependencies(dptree::deps![context])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
