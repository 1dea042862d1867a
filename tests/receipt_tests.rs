//! Extraction-policy tests for the receipt amount extractor.

use fintrack::receipt::extract_amount;

#[test]
fn extracts_the_prefixed_total_from_a_receipt_line() {
    assert_eq!(extract_amount("Total Rs 430.00 Thank you"), Some(430.00));
}

#[test]
fn recognizes_the_rupee_symbol_and_bare_numbers() {
    assert_eq!(extract_amount("₹99"), Some(99.0));
    assert_eq!(extract_amount("Lunch bill 250"), Some(250.0));
    assert_eq!(extract_amount("rs 12.5"), Some(12.5));
}

// Known limitation, preserved on purpose: the extractor takes the FIRST
// numeric token in reading order, not the largest and not the total. On a
// multi-line receipt whose subtotal (or any other number) precedes the
// total, the earlier number wins.
#[test]
fn first_match_wins_on_multi_line_receipts() {
    let text = "Subtotal 380.00\nGST 50.00\nTotal Rs 430.00";
    assert_eq!(extract_amount(text), Some(380.00));
}

// Same limitation from another angle: a receipt number in the header shadows
// the real total further down.
#[test]
fn header_numbers_shadow_later_totals() {
    let text = "Receipt #27\nTotal Rs 430.00";
    assert_eq!(extract_amount(text), Some(27.0));
}

// And when the first token is zero the extractor reports "not found" rather
// than scanning on to the next number.
#[test]
fn a_leading_zero_amount_means_not_found() {
    let text = "Discount Rs 0.00\nTotal Rs 430.00";
    assert_eq!(extract_amount(text), None);
}

#[test]
fn fractional_part_is_capped_at_two_digits() {
    assert_eq!(extract_amount("weight 123.456 kg"), Some(123.45));
}

#[test]
fn extraction_is_pure_and_idempotent() {
    let text = "Total Rs 430.00 Thank you";
    let first = extract_amount(text);
    let second = extract_amount(text);
    assert_eq!(first, second);
    assert_eq!(first, Some(430.00));
}

#[test]
fn never_returns_a_non_positive_amount() {
    for text in ["0", "0.00", "Rs 0", "no digits at all", ""] {
        assert_eq!(extract_amount(text), None, "input {text:?}");
    }
}
