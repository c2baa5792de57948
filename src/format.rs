// src/format.rs
// Display helpers for amounts, rates and times

use crate::domain::models::CoinType;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as money with thousands separators.
///
/// NGN is shown without fraction digits, every other currency with two.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let fraction_digits = if code == "NGN" { 0 } else { 2 };

    let mut rounded = amount
        .round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    rounded.rescale(fraction_digits);

    let symbol = match code.as_str() {
        "USD" => "$".to_string(),
        "NGN" => "₦".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{} ", other),
    };

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_decimal(&rounded.to_string()))
}

/// Format a coin amount with the coin's precision, e.g. `1,250.75 USDT`
pub fn format_coin_amount(amount: Decimal, coin: CoinType) -> String {
    let rounded = amount
        .round_dp_with_strategy(coin.display_precision(), RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let digits = group_decimal(&rounded.abs().to_string());
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{} {}", digits, coin)
    } else {
        format!("{} {}", digits, coin)
    }
}

/// `HH:MM:SS`, hours are not wrapped
pub fn format_duration(hours: u64, minutes: u64, seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Inclusive range check
pub fn validate_number_in_range(value: Decimal, min: Decimal, max: Decimal) -> bool {
    value >= min && value <= max
}

// Insert thousands separators into the integer part of an unsigned decimal string
fn group_decimal(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}
