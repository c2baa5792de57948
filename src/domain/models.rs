// src/domain/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Coins held on the desk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoinType {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "ETH")]
    Eth,
}

impl CoinType {
    pub const ALL: [CoinType; 3] = [CoinType::Btc, CoinType::Usdt, CoinType::Eth];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoinType::Btc => "BTC",
            CoinType::Usdt => "USDT",
            CoinType::Eth => "ETH",
        }
    }

    /// Maximum number of fraction digits shown for this coin
    pub fn display_precision(&self) -> u32 {
        match self {
            CoinType::Btc => 8,
            CoinType::Eth => 6,
            CoinType::Usdt => 2,
        }
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTC" => Ok(CoinType::Btc),
            "USDT" => Ok(CoinType::Usdt),
            "ETH" => Ok(CoinType::Eth),
            other => Err(format!("Unknown coin: {}", other)),
        }
    }
}

/// Trading platforms a transaction can originate from.
/// `All` is only meaningful as a filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "All Platform")]
    All,
    Binance,
    Paxful,
    Noones,
    Bybit,
    KuCoin,
    Other,
}

impl Platform {
    pub const TABS: [Platform; 7] = [
        Platform::All,
        Platform::Binance,
        Platform::Paxful,
        Platform::Noones,
        Platform::Bybit,
        Platform::KuCoin,
        Platform::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::All => "All Platform",
            Platform::Binance => "Binance",
            Platform::Paxful => "Paxful",
            Platform::Noones => "Noones",
            Platform::Bybit => "Bybit",
            Platform::KuCoin => "KuCoin",
            Platform::Other => "Other",
        }
    }

    /// Whether a transaction on `platform` is visible under this selection
    pub fn matches(&self, platform: Platform) -> bool {
        *self == Platform::All || *self == platform
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::TABS
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Buy,
    Sell,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "Buy"),
            TransactionType::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransactionStatus::Completed => write!(f, "Completed"),
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// 24h price movement shown on a balance card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub percentage: Decimal,
    pub is_positive: bool,
}

/// Holdings of one coin.
///
/// `current_rate` is quoted in the desk's quote currency per unit. `excess_coin` is the part
/// of the balance above the trader's capital and always lies in `0..=balance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinBalance {
    #[serde(rename = "type")]
    pub coin_type: CoinType,
    pub balance: Decimal,
    pub current_rate: Decimal,
    pub excess_coin: Decimal,
    pub change: PriceChange,
}

impl CoinBalance {
    pub fn new(
        coin_type: CoinType,
        balance: Decimal,
        current_rate: Decimal,
        excess_coin: Decimal,
        change: PriceChange,
    ) -> Self {
        let balance = balance.max(Decimal::ZERO);
        Self {
            coin_type,
            balance,
            current_rate,
            excess_coin: excess_coin.max(Decimal::ZERO).min(balance),
            change,
        }
    }

    /// Remove a traded amount from the holdings, never going below zero
    pub fn deduct(&mut self, amount: Decimal) {
        self.balance = (self.balance - amount).max(Decimal::ZERO);
        self.excess_coin = (self.excess_coin - amount).max(Decimal::ZERO).min(self.balance);
    }
}

/// Immutable record of an executed or seeded trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    pub coin: CoinType,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    /// Value in the ledger currency
    pub value: Decimal,
    pub status: TransactionStatus,
}

/// Snapshot of the exchange form handed to the trade executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeFormData {
    pub from_coin: Option<CoinType>,
    pub to_coin: Option<CoinType>,
    pub amount: Decimal,
    pub use_market_rate: bool,
    pub manual_rate: Decimal,
}

impl Default for ExchangeFormData {
    fn default() -> Self {
        Self {
            from_coin: None,
            to_coin: None,
            amount: Decimal::ZERO,
            use_market_rate: true,
            manual_rate: Decimal::ZERO,
        }
    }
}

/// Balance refresh cadence offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RefreshInterval {
    Now,
    EveryMinutes(u64),
}

impl RefreshInterval {
    pub const OPTIONS: [RefreshInterval; 5] = [
        RefreshInterval::Now,
        RefreshInterval::EveryMinutes(1),
        RefreshInterval::EveryMinutes(3),
        RefreshInterval::EveryMinutes(5),
        RefreshInterval::EveryMinutes(10),
    ];

    /// Period of the repeating refresh, `None` for a one-off refresh
    pub fn period(&self) -> Option<Duration> {
        match self {
            RefreshInterval::Now => None,
            RefreshInterval::EveryMinutes(minutes) => {
                Some(Duration::from_secs(minutes.saturating_mul(60)))
            }
        }
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RefreshInterval::Now => write!(f, "Refresh Now"),
            RefreshInterval::EveryMinutes(1) => write!(f, "Every 1 minute"),
            RefreshInterval::EveryMinutes(minutes) => write!(f, "Every {} minutes", minutes),
        }
    }
}

impl FromStr for RefreshInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("refresh now") || s.eq_ignore_ascii_case("now") {
            return Ok(RefreshInterval::Now);
        }

        // "Every N minute(s)"
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(every), Some(n), Some(unit), None)
                if every.eq_ignore_ascii_case("every") && unit.to_lowercase().starts_with("minute") =>
            {
                // only the cadences offered by the dashboard
                match n.parse::<u64>() {
                    Ok(minutes) => RefreshInterval::OPTIONS
                        .into_iter()
                        .find(|option| *option == RefreshInterval::EveryMinutes(minutes))
                        .ok_or_else(|| format!("Invalid refresh interval: {}", s)),
                    Err(_) => Err(format!("Invalid refresh interval: {}", s)),
                }
            }
            _ => Err(format!("Invalid refresh interval: {}", s)),
        }
    }
}

impl TryFrom<String> for RefreshInterval {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RefreshInterval> for String {
    fn from(interval: RefreshInterval) -> Self {
        interval.to_string()
    }
}
