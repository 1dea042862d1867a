//! Amount extraction from recognized receipt text.
//!
//! The extractor scans the text for an optional currency marker (`Rs` or `₹`)
//! followed by a numeric token with at most two fractional digits and takes
//! the **first** match in reading order. Taking the first match keeps the
//! behavior predictable on noisy scans; on multi-line receipts it can pick a
//! subtotal that precedes the total (see `tests/receipt_tests.rs`).

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

// Currency marker optional, one optional whitespace, then the numeric token.
const AMOUNT_PATTERN: &str = r"(?i)(?:Rs|₹)?\s?(\d+(?:\.\d{1,2})?)";

lazy_static! {
    static ref AMOUNT_REGEX: Regex =
        Regex::new(AMOUNT_PATTERN).expect("Amount pattern should be valid");
}

/// Extract the best-guess monetary amount from recognized receipt text.
///
/// Returns `None` when no numeric token is present or the first token parses
/// to zero or a non-finite value; callers never receive a non-positive
/// amount.
pub fn extract_amount(text: &str) -> Option<f64> {
    let captures = AMOUNT_REGEX.captures(text)?;
    let token = captures.get(1)?.as_str();

    let amount: f64 = match token.parse() {
        Ok(value) => value,
        Err(_) => return None,
    };

    if !amount.is_finite() || amount <= 0.0 {
        debug!(token, "Discarding non-positive amount token");
        return None;
    }

    Some(amount)
}
