//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPool;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::{debug, error, info};

use crate::dialogue::{EntryDialogue, EntryState, FlowInput, Menu, Reply};
use crate::ocr::TextRecognizer;

use super::{drive, ui_builder};

const WELCOME_MESSAGE: &str = "🌟 Welcome to Finance Tracker Bot!\n\n📱 Your personal finance assistant to track expenses, income, and savings.\n\nChoose an option below to get started:";

/// Download a Telegram file into memory.
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?;
    let bytes = response.bytes().await?;

    Ok(bytes.to_vec())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    text: &str,
    pool: &PgPool,
    dialogue: &EntryDialogue,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, message_length = text.len(), "Received text message from user");

    // Commands are transport-level and work regardless of any session.
    if text == "/start" {
        ui_builder::send_reply(bot, msg.chat.id, &Reply::with_menu(WELCOME_MESSAGE, Menu::Main))
            .await?;
        return Ok(());
    }
    if text == "/menu" {
        ui_builder::send_reply(bot, msg.chat.id, &Reply::with_menu("🏠 Main Menu", Menu::Main))
            .await?;
        return Ok(());
    }

    drive(bot, msg.chat.id, dialogue, pool, FlowInput::Text(text.to_string())).await
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    pool: &PgPool,
    recognizer: &TextRecognizer,
    dialogue: &EntryDialogue,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    // Recognition runs only when the flow is actually waiting for a receipt;
    // any other situation is resolved by the state machine without a
    // recognition call.
    let awaiting_receipt = matches!(dialogue.get().await?, Some(EntryState::AwaitingReceipt));
    if !awaiting_receipt {
        return drive(bot, msg.chat.id, dialogue, pool, FlowInput::ReceiptRecognized(None)).await;
    }

    let Some(photo) = msg.photo().and_then(|photos| photos.last()) else {
        return Ok(());
    };

    bot.send_message(msg.chat.id, "🔍 Processing your receipt...").await?;

    let recognized = match download_file(bot, photo.file.id.clone()).await {
        Ok(image) => match recognizer.recognize(&image).await {
            Ok(text) => {
                info!(
                    user_id = %msg.chat.id,
                    chars_recognized = text.as_deref().map(str::len).unwrap_or(0),
                    "Receipt recognition completed"
                );
                text
            }
            Err(e) => {
                // Degrades to the same user-facing path as an empty scan.
                error!(user_id = %msg.chat.id, error = %e, "Text recognition failed");
                None
            }
        },
        Err(e) => {
            error!(user_id = %msg.chat.id, error = %e, "Failed to download photo");
            None
        }
    };

    drive(bot, msg.chat.id, dialogue, pool, FlowInput::ReceiptRecognized(recognized)).await
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    pool: PgPool,
    recognizer: Arc<TextRecognizer>,
    dialogue: EntryDialogue,
) -> Result<()> {
    let handled = if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, text, &pool, &dialogue).await
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, &pool, &recognizer, &dialogue).await
    } else {
        // Stickers, voice notes and the like never participate in the flow.
        debug!(user_id = %msg.chat.id, "Ignoring unsupported message type");
        Ok(())
    };

    // Outermost per-event boundary: nothing may take the listener down or
    // leak into another chat's session.
    if let Err(e) = handled {
        error!(user_id = %msg.chat.id, error = %e, "Failed to handle message");
        let _ = bot
            .send_message(msg.chat.id, "❌ Unexpected error. Please try again.")
            .await;
    }

    Ok(())
}
