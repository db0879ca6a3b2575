use chrono::{Datelike, Utc};

/// Format-only card validation; no settlement happens in this system.
/// Accepts Visa, Mastercard, American Express and Discover number shapes.
pub fn is_valid_card_number(card_number: &str) -> bool {
    let digits: String = card_number.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        13 | 16 if digits.starts_with('4') => true, // Visa
        16 if matches!(&digits[..2], "51" | "52" | "53" | "54" | "55") => true, // Mastercard
        15 if matches!(&digits[..2], "34" | "37") => true, // Amex
        16 if digits.starts_with("6011") || digits.starts_with("65") => true, // Discover
        _ => false,
    }
}

/// Expiry in MM/YY form, not in the past.
pub fn is_valid_expiry(expiry: &str) -> bool {
    let Some((month_str, year_str)) = expiry.split_once('/') else {
        return false;
    };
    if month_str.len() != 2 || year_str.len() != 2 {
        return false;
    }
    let (Ok(month), Ok(year)) = (month_str.parse::<u32>(), year_str.parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }

    let now = Utc::now();
    let current_year = now.year() % 100;
    let current_month = now.month();

    year > current_year || (year == current_year && month >= current_month)
}

pub fn is_valid_cvv(cvv: &str) -> bool {
    (3..=4).contains(&cvv.len()) && cvv.chars().all(|c| c.is_ascii_digit())
}
