//! Transport-adapter tests: callback tag dispatch and keyboard construction.
//! Nothing here touches the network.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup};

use fintrack::bot::callback_handler::CallbackAction;
use fintrack::bot::ui_builder::keyboard_for;
use fintrack::categories::{self, TransactionKind};
use fintrack::dialogue::{EntryMethod, Menu};

fn tag(button: &InlineKeyboardButton) -> &str {
    match &button.kind {
        InlineKeyboardButtonKind::CallbackData(data) => data,
        other => panic!("expected a callback button, got {other:?}"),
    }
}

fn tags(keyboard: &InlineKeyboardMarkup) -> Vec<&str> {
    keyboard
        .inline_keyboard
        .iter()
        .flat_map(|row| row.iter().map(tag))
        .collect()
}

#[test]
fn fixed_tags_resolve_to_their_commands() {
    assert_eq!(
        CallbackAction::parse("new_transaction"),
        Some(CallbackAction::NewTransaction)
    );
    assert_eq!(
        CallbackAction::parse("back_to_menu"),
        Some(CallbackAction::BackToMenu)
    );
    assert_eq!(
        CallbackAction::parse("method_manual"),
        Some(CallbackAction::Method(EntryMethod::Manual))
    );
    assert_eq!(
        CallbackAction::parse("method_photo"),
        Some(CallbackAction::Method(EntryMethod::Photo))
    );
    assert_eq!(
        CallbackAction::parse("back_to_type"),
        Some(CallbackAction::BackToKind)
    );
    assert_eq!(
        CallbackAction::parse("skip_description"),
        Some(CallbackAction::SkipDescription)
    );
    assert_eq!(
        CallbackAction::parse("keep_scanned"),
        Some(CallbackAction::KeepScannedText)
    );
    assert_eq!(
        CallbackAction::parse("retry_save"),
        Some(CallbackAction::RetrySave)
    );
}

#[test]
fn kind_tags_carry_their_payload() {
    assert_eq!(
        CallbackAction::parse("type_expense"),
        Some(CallbackAction::Kind(TransactionKind::Expense))
    );
    assert_eq!(
        CallbackAction::parse("type_income"),
        Some(CallbackAction::Kind(TransactionKind::Income))
    );
    assert_eq!(
        CallbackAction::parse("type_saving"),
        Some(CallbackAction::Kind(TransactionKind::Saving))
    );
    assert_eq!(CallbackAction::parse("type_refund"), None);
}

#[test]
fn category_tags_keep_the_full_name() {
    assert_eq!(
        CallbackAction::parse("category_Food & Dining"),
        Some(CallbackAction::Category("Food & Dining".to_string()))
    );
    assert_eq!(
        CallbackAction::parse("category_Rent/Mortgage"),
        Some(CallbackAction::Category("Rent/Mortgage".to_string()))
    );
}

#[test]
fn unknown_tags_are_rejected() {
    assert_eq!(CallbackAction::parse(""), None);
    assert_eq!(CallbackAction::parse("nonsense"), None);
    assert_eq!(CallbackAction::parse("type_"), None);
}

#[test]
fn category_keyboard_preserves_registry_order() {
    let keyboard = keyboard_for(&Menu::CategoryPicker(TransactionKind::Expense));

    let expected: Vec<String> = categories::categories_of_kind(TransactionKind::Expense)
        .map(|c| format!("category_{}", c.name))
        .collect();

    let mut actual = tags(&keyboard);
    let back = actual.pop().expect("keyboard must end with a back button");
    assert_eq!(back, "back_to_type");
    assert_eq!(actual, expected);
}

#[test]
fn main_menu_keyboard_matches_the_menu_layout() {
    let keyboard = keyboard_for(&Menu::Main);
    assert_eq!(
        tags(&keyboard),
        vec!["new_transaction", "view_summary", "analytics", "settings"]
    );
}

#[test]
fn description_keyboard_offers_keep_only_after_a_scan() {
    let with_scan = keyboard_for(&Menu::DescriptionActions { has_scan: true });
    assert_eq!(
        tags(&with_scan),
        vec!["keep_scanned", "skip_description", "back_to_category"]
    );

    let without_scan = keyboard_for(&Menu::DescriptionActions { has_scan: false });
    assert_eq!(tags(&without_scan), vec!["skip_description", "back_to_category"]);
}

#[test]
fn every_rendered_tag_resolves_to_a_command() {
    let menus = [
        Menu::Main,
        Menu::MethodPicker,
        Menu::KindPicker,
        Menu::CategoryPicker(TransactionKind::Expense),
        Menu::CategoryPicker(TransactionKind::Income),
        Menu::CategoryPicker(TransactionKind::Saving),
        Menu::DescriptionActions { has_scan: true },
        Menu::DescriptionActions { has_scan: false },
        Menu::RecognitionFailed,
        Menu::PostSave,
        Menu::RetrySave,
        Menu::BackToMenu,
    ];

    for menu in &menus {
        let keyboard = keyboard_for(menu);
        for data in tags(&keyboard) {
            assert!(
                CallbackAction::parse(data).is_some(),
                "tag {data:?} from {menu:?} does not resolve"
            );
        }
    }
}
