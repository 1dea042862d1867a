//! UI Builder module for creating keyboards and rendering replies

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::categories::{self, TransactionKind};
use crate::dialogue::{Menu, Reply};

/// Send a state-machine reply, attaching the keyboard its menu tag names.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<()> {
    match &reply.menu {
        Some(menu) => {
            bot.send_message(chat_id, reply.text.clone())
                .reply_markup(keyboard_for(menu))
                .await?;
        }
        None => {
            bot.send_message(chat_id, reply.text.clone()).await?;
        }
    }
    Ok(())
}

/// Build the inline keyboard for a menu tag.
pub fn keyboard_for(menu: &Menu) -> InlineKeyboardMarkup {
    match menu {
        Menu::Main => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("💸 New Transaction", "new_transaction")],
            vec![InlineKeyboardButton::callback("📊 View Summary", "view_summary")],
            vec![InlineKeyboardButton::callback("📈 Analytics", "analytics")],
            vec![InlineKeyboardButton::callback("⚙️ Settings", "settings")],
        ]),
        Menu::MethodPicker => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("✍️ Manual Entry", "method_manual")],
            vec![InlineKeyboardButton::callback("📷 Photo Entry", "method_photo")],
            vec![InlineKeyboardButton::callback("🔙 Back to Menu", "back_to_menu")],
        ]),
        Menu::KindPicker => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("💸 Expense", "type_expense")],
            vec![InlineKeyboardButton::callback("💰 Income", "type_income")],
            vec![InlineKeyboardButton::callback("🏦 Saving", "type_saving")],
            vec![InlineKeyboardButton::callback("🔙 Back", "back_to_method")],
        ]),
        Menu::CategoryPicker(kind) => category_keyboard(*kind),
        Menu::DescriptionActions { has_scan } => {
            let mut rows = Vec::new();
            if *has_scan {
                rows.push(vec![InlineKeyboardButton::callback(
                    "📝 Keep Detected Text",
                    "keep_scanned",
                )]);
            }
            rows.push(vec![InlineKeyboardButton::callback(
                "⏭️ Skip Description",
                "skip_description",
            )]);
            rows.push(vec![InlineKeyboardButton::callback("🔙 Back", "back_to_category")]);
            InlineKeyboardMarkup::new(rows)
        }
        Menu::RecognitionFailed => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("✍️ Manual Entry", "method_manual")],
            vec![InlineKeyboardButton::callback("🔙 Back to Menu", "back_to_menu")],
        ]),
        Menu::PostSave => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback(
                "➕ Add Another Transaction",
                "new_transaction",
            )],
            vec![InlineKeyboardButton::callback("🏠 Back to Main Menu", "back_to_menu")],
        ]),
        Menu::RetrySave => InlineKeyboardMarkup::new(vec![
            vec![InlineKeyboardButton::callback("🔄 Try Again", "retry_save")],
            vec![InlineKeyboardButton::callback("🔙 Back to Menu", "back_to_menu")],
        ]),
        Menu::BackToMenu => InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("🔙 Back to Menu", "back_to_menu"),
        ]]),
    }
}

// One button per category, in registry declaration order, with a back row at
// the bottom.
fn category_keyboard(kind: TransactionKind) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = categories::categories_of_kind(kind)
        .map(|category| {
            vec![InlineKeyboardButton::callback(
                category.name,
                format!("category_{}", category.name),
            )]
        })
        .collect();

    rows.push(vec![InlineKeyboardButton::callback("🔙 Back", "back_to_type")]);
    InlineKeyboardMarkup::new(rows)
}
