//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles incoming commands, text, and photo messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and renders state-machine replies

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

use anyhow::Result;
use sqlx::postgres::PgPool;
use teloxide::prelude::*;
use tracing::error;

use crate::db;
use crate::dialogue::{self, EntryDialogue, FlowInput, NextState};

/// Feed one translated input through the state machine and apply the result:
/// render the reply, run a pending save effect, and commit the next session
/// state to the per-chat dialogue storage.
pub(crate) async fn drive(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: &EntryDialogue,
    pool: &PgPool,
    input: FlowInput,
) -> Result<()> {
    let state = dialogue.get().await?;
    let mut step = dialogue::advance(state, input);

    if let Some(reply) = &step.reply {
        ui_builder::send_reply(bot, chat_id, reply).await?;
    }

    if let Some(draft) = step.save.take() {
        let saved = db::save_transaction(pool, chat_id.0, &draft).await;
        if let Err(e) = &saved {
            error!(user_id = %chat_id, error = %e, "Failed to save transaction");
        }
        step = dialogue::settle_save(draft, saved.is_ok());
        if let Some(reply) = &step.reply {
            ui_builder::send_reply(bot, chat_id, reply).await?;
        }
    }

    match step.next {
        NextState::Stay => {}
        NextState::Update(state) => dialogue.update(state).await?,
        NextState::End => dialogue.exit().await?,
    }

    Ok(())
}
