//! Static category registry mapping category names to transaction kinds.

use serde::{Deserialize, Serialize};

/// The kind of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Expense,
    Income,
    Saving,
}

impl TransactionKind {
    /// Stable lowercase tag, used in callback data and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
            TransactionKind::Saving => "saving",
        }
    }

    /// Parse a tag produced by [`TransactionKind::as_str`].
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "expense" => Some(TransactionKind::Expense),
            "income" => Some(TransactionKind::Income),
            "saving" => Some(TransactionKind::Saving),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
            TransactionKind::Saving => "Saving",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "💸",
            TransactionKind::Income => "💰",
            TransactionKind::Saving => "🏦",
        }
    }
}

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub kind: TransactionKind,
}

/// Fixed registry, read-only after startup. Declaration order is the
/// presentation order of category keyboards, so it must stay stable.
pub static CATEGORIES: &[Category] = &[
    Category { name: "Entertainment", kind: TransactionKind::Expense },
    Category { name: "Side Hustle", kind: TransactionKind::Income },
    Category { name: "Personal Care", kind: TransactionKind::Expense },
    Category { name: "Food & Dining", kind: TransactionKind::Expense },
    Category { name: "Gifts & Donations", kind: TransactionKind::Expense },
    Category { name: "Groceries", kind: TransactionKind::Expense },
    Category { name: "Subscriptions", kind: TransactionKind::Expense },
    Category { name: "Shopping", kind: TransactionKind::Expense },
    Category { name: "Emergency Fund", kind: TransactionKind::Saving },
    Category { name: "Business", kind: TransactionKind::Income },
    Category { name: "Rent/Mortgage", kind: TransactionKind::Expense },
    Category { name: "Education Fund", kind: TransactionKind::Saving },
    Category { name: "Fuel", kind: TransactionKind::Expense },
    Category { name: "Vacation Fund", kind: TransactionKind::Saving },
    Category { name: "Health & Medical", kind: TransactionKind::Expense },
    Category { name: "Insurance", kind: TransactionKind::Expense },
    Category { name: "Other Income", kind: TransactionKind::Income },
    Category { name: "Other Expenses", kind: TransactionKind::Expense },
    Category { name: "Freelance", kind: TransactionKind::Income },
    Category { name: "Investment", kind: TransactionKind::Saving },
    Category { name: "Retirement", kind: TransactionKind::Saving },
    Category { name: "Transportation", kind: TransactionKind::Expense },
    Category { name: "Utilities", kind: TransactionKind::Expense },
    Category { name: "Salary", kind: TransactionKind::Income },
];

/// Categories of the given kind, in registry declaration order.
pub fn categories_of_kind(kind: TransactionKind) -> impl Iterator<Item = &'static Category> {
    CATEGORIES.iter().filter(move |c| c.kind == kind)
}

/// Whether `name` is a registered category of the given kind.
pub fn is_known_category(kind: TransactionKind, name: &str) -> bool {
    categories_of_kind(kind).any(|c| c.name == name)
}
