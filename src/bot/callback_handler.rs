//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use sqlx::postgres::PgPool;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

use crate::categories::TransactionKind;
use crate::dialogue::{EntryDialogue, EntryMethod, FlowInput, Menu, Reply};

use super::{drive, ui_builder};

/// Commands encoded in inline-keyboard callback data. Tags are fixed; the
/// `type_` and `category_` families carry a payload.
#[derive(Clone, Debug, PartialEq)]
pub enum CallbackAction {
    NewTransaction,
    ViewSummary,
    Analytics,
    Settings,
    BackToMenu,
    Method(EntryMethod),
    Kind(TransactionKind),
    Category(String),
    BackToMethod,
    BackToKind,
    BackToCategory,
    SkipDescription,
    KeepScannedText,
    RetrySave,
}

impl CallbackAction {
    /// Resolve a callback tag to a command.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "new_transaction" => Some(Self::NewTransaction),
            "view_summary" => Some(Self::ViewSummary),
            "analytics" => Some(Self::Analytics),
            "settings" => Some(Self::Settings),
            "back_to_menu" => Some(Self::BackToMenu),
            "method_manual" => Some(Self::Method(EntryMethod::Manual)),
            "method_photo" => Some(Self::Method(EntryMethod::Photo)),
            "back_to_method" => Some(Self::BackToMethod),
            "back_to_type" => Some(Self::BackToKind),
            "back_to_category" => Some(Self::BackToCategory),
            "skip_description" => Some(Self::SkipDescription),
            "keep_scanned" => Some(Self::KeepScannedText),
            "retry_save" => Some(Self::RetrySave),
            _ => {
                if let Some(tag) = data.strip_prefix("type_") {
                    return TransactionKind::parse(tag).map(Self::Kind);
                }
                if let Some(name) = data.strip_prefix("category_") {
                    return Some(Self::Category(name.to_string()));
                }
                None
            }
        }
    }
}

async fn stub_reply(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    ui_builder::send_reply(bot, chat_id, &Reply::with_menu(text, Menu::BackToMenu)).await
}

/// Handle callback queries from inline keyboards.
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    pool: PgPool,
    dialogue: EntryDialogue,
) -> Result<()> {
    let user_id = q.from.id;
    let chat_id = q.message.as_ref().map(|message| message.chat().id);

    // Outermost per-event boundary: nothing may take the listener down or
    // leak into another chat's session.
    if let Err(e) = handle_callback(&bot, q, &pool, &dialogue).await {
        error!(user_id = %user_id, error = %e, "Failed to handle callback query");
        if let Some(chat_id) = chat_id {
            let _ = bot
                .send_message(chat_id, "❌ Unexpected error. Please try again.")
                .await;
        }
    }

    Ok(())
}

async fn handle_callback(
    bot: &Bot,
    q: teloxide::types::CallbackQuery,
    pool: &PgPool,
    dialogue: &EntryDialogue,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    // Acknowledge the button press regardless of what the reply will be.
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = &q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let Some(action) = CallbackAction::parse(data) else {
        warn!(user_id = %q.from.id, data, "Unknown callback tag");
        return Ok(());
    };

    let input = match action {
        CallbackAction::ViewSummary => {
            return stub_reply(
                bot,
                chat_id,
                "📊 Feature coming soon! This will show your spending summary.",
            )
            .await;
        }
        CallbackAction::Analytics => {
            return stub_reply(
                bot,
                chat_id,
                "📈 Feature coming soon! This will show detailed analytics.",
            )
            .await;
        }
        CallbackAction::Settings => {
            return stub_reply(
                bot,
                chat_id,
                "⚙️ Feature coming soon! This will allow you to customize settings.",
            )
            .await;
        }
        CallbackAction::NewTransaction => FlowInput::NewEntry,
        CallbackAction::BackToMenu => FlowInput::CancelToMenu,
        CallbackAction::Method(method) => FlowInput::MethodChosen(method),
        CallbackAction::Kind(kind) => FlowInput::KindChosen(kind),
        CallbackAction::Category(name) => FlowInput::CategoryChosen(name),
        CallbackAction::BackToMethod => FlowInput::BackToMethod,
        CallbackAction::BackToKind => FlowInput::BackToKind,
        CallbackAction::BackToCategory => FlowInput::BackToCategory,
        CallbackAction::SkipDescription => FlowInput::SkipDescription,
        CallbackAction::KeepScannedText => FlowInput::KeepScannedText,
        CallbackAction::RetrySave => FlowInput::RetrySave,
    };

    drive(bot, chat_id, dialogue, pool, input).await
}
