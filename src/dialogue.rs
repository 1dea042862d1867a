//! Transaction-entry dialogue module: the per-user conversation state machine.
//!
//! Each chat owns at most one [`EntryState`]; the state is a closed set of
//! variants carrying exactly the fields that exist at that step, so stale
//! combinations (a category without a kind, a pre-filled amount outside the
//! photo branch) cannot be represented. Transitions are pure: [`advance`]
//! maps the current state plus one [`FlowInput`] to a [`Transition`], and the
//! transport layer applies it. Saving is a two-phase effect: [`advance`]
//! hands out a [`TransactionDraft`], the caller performs the write and feeds
//! the outcome to [`settle_save`].

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use tracing::warn;

use crate::categories::{self, TransactionKind};
use crate::receipt;

/// How the transaction is being entered. Fixed for the life of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMethod {
    Manual,
    Photo,
}

/// Amount pre-filled from a scanned receipt, together with the recognized
/// text so the description step can offer it as a note. Only the photo
/// branch ever produces one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiptScan {
    pub amount: f64,
    pub recognized_text: String,
}

/// A completed entry, ready to be recorded. Held across save retries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

/// Conversation state for the transaction-entry dialogue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum EntryState {
    /// No entry flow in progress.
    #[default]
    Start,
    SelectingMethod,
    AwaitingReceipt,
    SelectingKind {
        method: EntryMethod,
        scan: Option<ReceiptScan>,
    },
    SelectingCategory {
        method: EntryMethod,
        kind: TransactionKind,
        scan: Option<ReceiptScan>,
    },
    AwaitingAmount {
        method: EntryMethod,
        kind: TransactionKind,
        category: String,
    },
    AwaitingDescription {
        method: EntryMethod,
        kind: TransactionKind,
        category: String,
        amount: f64,
        scanned_note: Option<String>,
    },
    SaveFailed {
        draft: TransactionDraft,
    },
}

/// Type alias for the transaction-entry dialogue.
pub type EntryDialogue = Dialogue<EntryState, InMemStorage<EntryState>>;

/// One inbound event, already translated from the transport.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowInput {
    NewEntry,
    CancelToMenu,
    MethodChosen(EntryMethod),
    /// Recognized text of a submitted receipt photo; `None` when the
    /// recognition service found no text (or could not be reached).
    ReceiptRecognized(Option<String>),
    KindChosen(TransactionKind),
    CategoryChosen(String),
    BackToMethod,
    BackToKind,
    BackToCategory,
    Text(String),
    SkipDescription,
    KeepScannedText,
    RetrySave,
}

/// Which keyboard the transport should attach to a reply.
#[derive(Clone, Debug, PartialEq)]
pub enum Menu {
    Main,
    MethodPicker,
    KindPicker,
    CategoryPicker(TransactionKind),
    DescriptionActions { has_scan: bool },
    RecognitionFailed,
    PostSave,
    RetrySave,
    BackToMenu,
}

/// An output directive: prompt text plus an optional choice keyboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), menu: None }
    }

    pub fn with_menu(text: impl Into<String>, menu: Menu) -> Self {
        Self { text: text.into(), menu: Some(menu) }
    }
}

/// What to do with the stored session after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum NextState {
    /// Leave the stored state untouched.
    Stay,
    Update(EntryState),
    /// Destroy the session.
    End,
}

/// Result of feeding one input to the state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub next: NextState,
    pub reply: Option<Reply>,
    /// A draft to record. The caller must perform the write and settle the
    /// outcome through [`settle_save`].
    pub save: Option<TransactionDraft>,
}

impl Transition {
    fn reply(next: NextState, reply: Reply) -> Self {
        Self { next, reply: Some(reply), save: None }
    }

    fn silent() -> Self {
        Self { next: NextState::Stay, reply: None, save: None }
    }
}

/// Validates a manually typed amount.
///
/// Accepts any finite decimal strictly greater than zero and rounds it to
/// hundredths; everything else is rejected with a short reason tag.
pub fn validate_amount(input: &str) -> Result<f64, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    let amount: f64 = trimmed.parse().map_err(|_| "not_a_number")?;

    if !amount.is_finite() {
        return Err("not_finite");
    }

    let amount = (amount * 100.0).round() / 100.0;
    if amount <= 0.0 {
        return Err("not_positive");
    }

    Ok(amount)
}

/// Advance the state machine by one input.
pub fn advance(state: Option<EntryState>, input: FlowInput) -> Transition {
    // A stored default state means the same as no session at all.
    let state = match state {
        Some(EntryState::Start) | None => None,
        other => other,
    };

    match input {
        // Starting over is always allowed; it replaces any session in flight.
        FlowInput::NewEntry => {
            Transition::reply(NextState::Update(EntryState::SelectingMethod), method_prompt())
        }

        FlowInput::CancelToMenu => {
            let next = if state.is_some() { NextState::End } else { NextState::Stay };
            Transition::reply(next, Reply::with_menu("🏠 Main Menu", Menu::Main))
        }

        FlowInput::MethodChosen(method) => match (state, method) {
            (Some(EntryState::SelectingMethod), EntryMethod::Manual) => Transition::reply(
                NextState::Update(EntryState::SelectingKind {
                    method: EntryMethod::Manual,
                    scan: None,
                }),
                kind_prompt(EntryMethod::Manual),
            ),
            (Some(EntryState::SelectingMethod), EntryMethod::Photo) => {
                Transition::reply(NextState::Update(EntryState::AwaitingReceipt), photo_prompt())
            }
            // Manual fallback offered after a failed scan: restart the branch
            // at the type step with nothing pre-filled.
            (Some(EntryState::AwaitingReceipt), EntryMethod::Manual) => Transition::reply(
                NextState::Update(EntryState::SelectingKind {
                    method: EntryMethod::Manual,
                    scan: None,
                }),
                kind_prompt(EntryMethod::Manual),
            ),
            (other, _) => invalid_input(other),
        },

        FlowInput::ReceiptRecognized(text) => match state {
            Some(EntryState::AwaitingReceipt) => match text {
                Some(raw) => match receipt::extract_amount(&raw) {
                    Some(amount) => {
                        let scan = ReceiptScan {
                            amount,
                            recognized_text: raw.trim().to_string(),
                        };
                        let reply = scanned_kind_prompt(&scan);
                        Transition::reply(
                            NextState::Update(EntryState::SelectingKind {
                                method: EntryMethod::Photo,
                                scan: Some(scan),
                            }),
                            reply,
                        )
                    }
                    None => Transition::reply(
                        NextState::Stay,
                        Reply::with_menu(
                            "❌ Could not extract amount from the image. Please try again or enter manually.",
                            Menu::RecognitionFailed,
                        ),
                    ),
                },
                None => Transition::reply(
                    NextState::Stay,
                    Reply::with_menu(
                        "❌ No readable text found in the image. Please try again or use manual entry.",
                        Menu::RecognitionFailed,
                    ),
                ),
            },
            other => invalid_input(other),
        },

        FlowInput::KindChosen(kind) => match state {
            Some(EntryState::SelectingKind { method, scan }) => Transition::reply(
                NextState::Update(EntryState::SelectingCategory { method, kind, scan }),
                category_prompt(kind),
            ),
            other => invalid_input(other),
        },

        FlowInput::CategoryChosen(name) => match state {
            Some(EntryState::SelectingCategory { method, kind, scan }) => {
                if !categories::is_known_category(kind, &name) {
                    // Stale keyboard: the offered choice does not exist for
                    // this kind. Tear the session down instead of guessing.
                    warn!(category = %name, kind = kind.as_str(), "Chosen category missing from registry");
                    return Transition::reply(NextState::End, expired_reply());
                }
                match scan {
                    // A scanned amount is already on file, so the amount step
                    // is skipped entirely.
                    Some(scan) => {
                        let reply = scanned_description_prompt(scan.amount);
                        Transition::reply(
                            NextState::Update(EntryState::AwaitingDescription {
                                method,
                                kind,
                                category: name,
                                amount: scan.amount,
                                scanned_note: Some(scan.recognized_text),
                            }),
                            reply,
                        )
                    }
                    None => Transition::reply(
                        NextState::Update(EntryState::AwaitingAmount {
                            method,
                            kind,
                            category: name,
                        }),
                        amount_prompt(),
                    ),
                }
            }
            other => invalid_input(other),
        },

        FlowInput::BackToMethod => match state {
            // Dropping the variant payload discards any scan, so a later
            // manual branch can never inherit a pre-filled amount.
            Some(EntryState::SelectingKind { .. }) => {
                Transition::reply(NextState::Update(EntryState::SelectingMethod), method_prompt())
            }
            other => invalid_input(other),
        },

        FlowInput::BackToKind => match state {
            Some(EntryState::SelectingCategory { method, scan, .. }) => Transition::reply(
                NextState::Update(EntryState::SelectingKind { method, scan }),
                kind_prompt(method),
            ),
            other => invalid_input(other),
        },

        FlowInput::BackToCategory => match state {
            Some(EntryState::AwaitingDescription {
                method,
                kind,
                amount,
                scanned_note,
                ..
            }) => {
                let scan = scanned_note.map(|recognized_text| ReceiptScan {
                    amount,
                    recognized_text,
                });
                Transition::reply(
                    NextState::Update(EntryState::SelectingCategory { method, kind, scan }),
                    category_prompt(kind),
                )
            }
            other => invalid_input(other),
        },

        FlowInput::Text(text) => match state {
            // Unsolicited chatter outside a flow must not produce a reply.
            None => Transition::silent(),
            Some(EntryState::AwaitingAmount { method, kind, category }) => {
                match validate_amount(&text) {
                    Ok(amount) => Transition::reply(
                        NextState::Update(EntryState::AwaitingDescription {
                            method,
                            kind,
                            category,
                            amount,
                            scanned_note: None,
                        }),
                        description_prompt(),
                    ),
                    Err(_) => Transition::reply(
                        NextState::Stay,
                        Reply::text("❌ Invalid amount. Please enter a valid positive number:"),
                    ),
                }
            }
            Some(EntryState::AwaitingDescription {
                kind,
                category,
                amount,
                ..
            }) => begin_save(TransactionDraft {
                kind,
                category,
                amount,
                description: text,
            }),
            Some(other) => invalid_input(Some(other)),
        },

        FlowInput::SkipDescription => match state {
            Some(EntryState::AwaitingDescription {
                kind,
                category,
                amount,
                ..
            }) => begin_save(TransactionDraft {
                kind,
                category,
                amount,
                description: String::new(),
            }),
            other => invalid_input(other),
        },

        FlowInput::KeepScannedText => match state {
            Some(EntryState::AwaitingDescription {
                kind,
                category,
                amount,
                scanned_note: Some(note),
                ..
            }) => begin_save(TransactionDraft {
                kind,
                category,
                amount,
                description: note,
            }),
            other => invalid_input(other),
        },

        FlowInput::RetrySave => match state {
            Some(EntryState::SaveFailed { draft }) => begin_save(draft),
            other => invalid_input(other),
        },
    }
}

/// Settle the outcome of a save effect handed out by [`advance`].
pub fn settle_save(draft: TransactionDraft, success: bool) -> Transition {
    if success {
        Transition::reply(
            NextState::End,
            Reply::with_menu("✅ Transaction saved successfully!", Menu::PostSave),
        )
    } else {
        // The draft survives so the user can retry without re-entering
        // anything.
        Transition::reply(
            NextState::Update(EntryState::SaveFailed { draft }),
            Reply::with_menu("❌ Error saving transaction. Please try again.", Menu::RetrySave),
        )
    }
}

fn begin_save(draft: TransactionDraft) -> Transition {
    Transition {
        next: NextState::Stay,
        reply: Some(Reply::text("Saving your transaction...")),
        save: Some(draft),
    }
}

/// An input that does not fit the current step: with a live session,
/// re-prompt the step with a corrective note; with no session, the button
/// came from an expired keyboard.
fn invalid_input(state: Option<EntryState>) -> Transition {
    match state {
        Some(state) => {
            let prompt = step_prompt(&state);
            Transition::reply(
                NextState::Stay,
                Reply {
                    text: format!("⚠️ That option isn't available right now.\n\n{}", prompt.text),
                    menu: prompt.menu,
                },
            )
        }
        None => Transition::reply(NextState::Stay, expired_reply()),
    }
}

/// The entry prompt of a step, used when (re-)presenting it.
fn step_prompt(state: &EntryState) -> Reply {
    match state {
        EntryState::Start => Reply::with_menu("🏠 Main Menu", Menu::Main),
        EntryState::SelectingMethod => method_prompt(),
        EntryState::AwaitingReceipt => photo_prompt(),
        EntryState::SelectingKind { method, .. } => kind_prompt(*method),
        EntryState::SelectingCategory { kind, .. } => category_prompt(*kind),
        EntryState::AwaitingAmount { .. } => amount_prompt(),
        EntryState::AwaitingDescription { scanned_note, amount, .. } => match scanned_note {
            Some(_) => scanned_description_prompt(*amount),
            None => description_prompt(),
        },
        EntryState::SaveFailed { .. } => Reply::with_menu(
            "❌ Error saving transaction. Please try again.",
            Menu::RetrySave,
        ),
    }
}

fn expired_reply() -> Reply {
    Reply::with_menu("❌ Session expired. Please start again.", Menu::Main)
}

fn method_prompt() -> Reply {
    Reply::with_menu(
        "💳 New Transaction\n\nHow would you like to add your transaction?",
        Menu::MethodPicker,
    )
}

fn photo_prompt() -> Reply {
    Reply::text("📷 Please upload a photo of your bill or receipt.")
}

fn kind_prompt(method: EntryMethod) -> Reply {
    let header = match method {
        EntryMethod::Manual => "✍️ Manual Entry",
        EntryMethod::Photo => "🧾 Receipt Entry",
    };
    Reply::with_menu(
        format!("{header}\n\nWhat type of transaction is this?"),
        Menu::KindPicker,
    )
}

fn scanned_kind_prompt(scan: &ReceiptScan) -> Reply {
    Reply::with_menu(
        format!(
            "🧾 Detected Amount: ₹{}\n\n📝 Text:\n{}\n\nWhat type of transaction is this?",
            scan.amount, scan.recognized_text
        ),
        Menu::KindPicker,
    )
}

fn category_prompt(kind: TransactionKind) -> Reply {
    Reply::with_menu(
        format!("{} {} Transaction\n\nChoose a category:", kind.emoji(), kind.label()),
        Menu::CategoryPicker(kind),
    )
}

fn amount_prompt() -> Reply {
    Reply::text("💵 Please enter the amount (numbers only):")
}

fn description_prompt() -> Reply {
    Reply::with_menu(
        "📝 Enter a description or note for this transaction (optional):",
        Menu::DescriptionActions { has_scan: false },
    )
}

fn scanned_description_prompt(amount: f64) -> Reply {
    Reply::with_menu(
        format!("💵 Amount detected: ₹{amount}\n\nYou can add a description or skip:"),
        Menu::DescriptionActions { has_scan: true },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_validation_accepts_positive_decimals() {
        assert_eq!(validate_amount("12.5"), Ok(12.5));
        assert_eq!(validate_amount("100"), Ok(100.0));
        assert_eq!(validate_amount("  250 "), Ok(250.0));
    }

    #[test]
    fn amount_validation_rejects_bad_input() {
        assert!(validate_amount("-5").is_err());
        assert!(validate_amount("0").is_err());
        assert!(validate_amount("abc").is_err());
        assert!(validate_amount("").is_err());
        assert!(validate_amount("inf").is_err());
        assert!(validate_amount("NaN").is_err());
    }

    #[test]
    fn amount_validation_rounds_to_hundredths() {
        assert_eq!(validate_amount("12.345"), Ok(12.35));
        // Rounds down to zero, so it is not a positive amount.
        assert!(validate_amount("0.004").is_err());
    }

    #[test]
    fn back_from_category_returns_to_kind_selection() {
        let state = EntryState::SelectingCategory {
            method: EntryMethod::Manual,
            kind: TransactionKind::Expense,
            scan: None,
        };
        let step = advance(Some(state), FlowInput::BackToKind);
        assert_eq!(
            step.next,
            NextState::Update(EntryState::SelectingKind {
                method: EntryMethod::Manual,
                scan: None,
            })
        );
    }

    #[test]
    fn back_to_method_discards_receipt_scan() {
        let state = EntryState::SelectingKind {
            method: EntryMethod::Photo,
            scan: Some(ReceiptScan {
                amount: 430.0,
                recognized_text: "Total Rs 430.00".to_string(),
            }),
        };
        let step = advance(Some(state), FlowInput::BackToMethod);
        assert_eq!(step.next, NextState::Update(EntryState::SelectingMethod));
    }

    #[test]
    fn stale_category_choice_expires_the_session() {
        let state = EntryState::SelectingCategory {
            method: EntryMethod::Manual,
            kind: TransactionKind::Expense,
            scan: None,
        };
        // "Salary" is an income category, so an expense keyboard can never
        // legitimately offer it.
        let step = advance(Some(state), FlowInput::CategoryChosen("Salary".to_string()));
        assert_eq!(step.next, NextState::End);
        assert!(step.save.is_none());
    }

    #[test]
    fn text_without_a_session_is_ignored() {
        let step = advance(None, FlowInput::Text("hello there".to_string()));
        assert_eq!(step.next, NextState::Stay);
        assert!(step.reply.is_none());
        assert!(step.save.is_none());
    }

    #[test]
    fn button_without_a_session_reports_expiry() {
        let step = advance(None, FlowInput::KindChosen(TransactionKind::Expense));
        assert_eq!(step.next, NextState::Stay);
        let reply = step.reply.expect("expiry notice expected");
        assert!(reply.text.contains("expired"));
        assert_eq!(reply.menu, Some(Menu::Main));
    }
}
