use std::env;
use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPool;
use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fintrack::bot;
use fintrack::db;
use fintrack::dialogue::EntryState;
use fintrack::ocr::{OcrConfig, TextRecognizer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Finance Tracker Bot");

    let bot_token = env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN must be set");
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("Connecting to database");
    let pool = PgPool::connect(&database_url).await?;
    db::init_database_schema(&pool).await?;

    let recognizer = Arc::new(TextRecognizer::new(OcrConfig::from_env()?)?);

    let bot = Bot::new(bot_token);

    info!("Bot initialized, starting dispatcher");

    let handler = dialogue::enter::<Update, InMemStorage<EntryState>, EntryState, _>()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![
            pool,
            recognizer,
            InMemStorage::<EntryState>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
