// src/desk/seed.rs
// Sample desk contents used by the demo binary and tests

use crate::domain::models::{
    CoinBalance, CoinType, Platform, PriceChange, Transaction, TransactionStatus, TransactionType,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

pub fn initial_balances() -> Vec<CoinBalance> {
    vec![
        CoinBalance::new(
            CoinType::Btc,
            dec!(0.45),
            dec!(62500),
            dec!(0.2),
            PriceChange { percentage: dec!(2.3), is_positive: true },
        ),
        CoinBalance::new(
            CoinType::Usdt,
            dec!(1250.75),
            dec!(1.0),
            dec!(500.0),
            PriceChange { percentage: dec!(0.01), is_positive: true },
        ),
        CoinBalance::new(
            CoinType::Eth,
            dec!(3.2),
            dec!(3450.0),
            dec!(1.5),
            PriceChange { percentage: dec!(1.2), is_positive: false },
        ),
    ]
}

/// Historical transactions, values in NGN
pub fn sample_transactions() -> Vec<Transaction> {
    vec![
        transaction("1", at(2025, 5, 12, 14, 30), Platform::Binance, CoinType::Btc, TransactionType::Buy, dec!(0.05), dec!(1850000), TransactionStatus::Completed),
        transaction("2", at(2025, 5, 9, 9, 15), Platform::Paxful, CoinType::Btc, TransactionType::Sell, dec!(0.02), dec!(740000), TransactionStatus::Completed),
        transaction("3", at(2025, 5, 5, 16, 45), Platform::Binance, CoinType::Eth, TransactionType::Buy, dec!(1.5), dec!(3150000), TransactionStatus::Completed),
        transaction("4", at(2025, 5, 5, 11, 20), Platform::KuCoin, CoinType::Usdt, TransactionType::Buy, dec!(500), dec!(500000), TransactionStatus::Pending),
        transaction("5", at(2025, 5, 14, 13, 10), Platform::Paxful, CoinType::Btc, TransactionType::Sell, dec!(0.03), dec!(1110000), TransactionStatus::Failed),
    ]
}

#[allow(clippy::too_many_arguments)]
fn transaction(
    id: &str,
    timestamp: DateTime<Utc>,
    platform: Platform,
    coin: CoinType,
    kind: TransactionType,
    amount: rust_decimal::Decimal,
    value: rust_decimal::Decimal,
    status: TransactionStatus,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp,
        platform,
        coin,
        kind,
        amount,
        value,
        status,
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
