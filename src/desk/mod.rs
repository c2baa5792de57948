// src/desk/mod.rs
pub mod balances;
pub mod ledger;
pub mod seed;

pub use balances::BalanceBook;
pub use ledger::{NewTransaction, TransactionLog};

use crate::domain::errors::{ExecutionError, ExecutionResult, ScheduleResult};
use crate::domain::models::{
    CoinBalance, ExchangeFormData, Platform, Transaction, TransactionStatus, TransactionType,
};
use crate::exchange::client::{BalanceFeed, TradeExecutor};
use crate::trading::calculator::ExchangeCalculator;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard};
use tokio::time::Duration;

/// Settlement settings for the desk
#[derive(Debug, Clone)]
pub struct DeskSettings {
    /// Multiplier from the quote currency of coin rates to the ledger currency
    pub conversion_factor: Decimal,
    pub ledger_currency: String,
    /// Platform recorded on trades executed from the desk
    pub default_platform: Platform,
    /// Simulated time for a trade to settle
    pub execution_latency: Duration,
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self {
            conversion_factor: Decimal::new(1000, 0),
            ledger_currency: "NGN".to_string(),
            default_platform: Platform::Binance,
            execution_latency: Duration::from_millis(1500),
        }
    }
}

/// Dashboard state: coin balances plus the transaction history they produced.
///
/// Trades are validated up front, then settle after the configured latency. Balances and
/// history only change once a trade settles.
pub struct ExchangeDesk {
    calculator: ExchangeCalculator,
    settings: DeskSettings,
    conversion_factor: Mutex<Decimal>,
    balances: Mutex<BalanceBook>,
    transactions: Mutex<TransactionLog>,
}

impl ExchangeDesk {
    pub fn new(
        calculator: ExchangeCalculator,
        settings: DeskSettings,
        balances: Vec<CoinBalance>,
        history: Vec<Transaction>,
    ) -> Self {
        Self {
            calculator,
            conversion_factor: Mutex::new(settings.conversion_factor),
            settings,
            balances: Mutex::new(BalanceBook::new(balances)),
            transactions: Mutex::new(TransactionLog::with_history(history)),
        }
    }

    pub fn calculator(&self) -> ExchangeCalculator {
        self.calculator.clone()
    }

    pub fn settings(&self) -> &DeskSettings {
        &self.settings
    }

    pub fn balances(&self) -> Vec<CoinBalance> {
        lock(&self.balances).snapshot()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        lock(&self.transactions).iter().cloned().collect()
    }

    /// History visible under a platform tab
    pub fn transactions_for(&self, platform: Platform) -> Vec<Transaction> {
        lock(&self.transactions)
            .filter(platform)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn conversion_factor(&self) -> Decimal {
        *lock(&self.conversion_factor)
    }

    /// Update the FX factor used for settlement values
    pub fn set_conversion_factor(&self, factor: Decimal) {
        log::info!("Conversion factor set to {}", factor);
        *lock(&self.conversion_factor) = factor;
    }

    /// Value of every holding at current rates, in the quote currency
    pub fn total_value(&self) -> Decimal {
        lock(&self.balances).total_value()
    }

    /// Pull fresh rates from `feed`.
    ///
    /// Only rates and 24h change are taken from the feed, so a trade settling while the feed
    /// is being polled keeps its deduction.
    pub async fn refresh_from(&self, feed: &dyn BalanceFeed) -> ScheduleResult<()> {
        let current = self.balances();
        let refreshed = feed.refresh(&current).await?;

        let applied = lock(&self.balances).apply_rates(&refreshed);
        log::info!("Refreshed rates for {} coins", applied);
        Ok(())
    }

    // Check the form against the book and work out what the trade is worth
    fn quote(&self, form: &ExchangeFormData) -> ExecutionResult<(CoinBalance, Decimal)> {
        let from = form
            .from_coin
            .ok_or_else(|| ExecutionError::Rejected("no coin to exchange".to_string()))?;
        if form.to_coin.is_none() {
            return Err(ExecutionError::Rejected("no target coin".to_string()));
        }
        if form.to_coin == Some(from) {
            return Err(ExecutionError::Rejected(format!("cannot exchange {} for itself", from)));
        }
        if form.amount <= Decimal::ZERO {
            return Err(ExecutionError::Rejected("amount must be positive".to_string()));
        }

        let coin = lock(&self.balances)
            .get(from)
            .cloned()
            .ok_or(ExecutionError::UnknownCoin(from))?;

        if form.amount > coin.balance {
            return Err(ExecutionError::InsufficientBalance {
                coin: from,
                requested: form.amount,
                available: coin.balance,
            });
        }

        let rate = if form.use_market_rate {
            coin.current_rate
        } else {
            form.manual_rate
        };
        let value = self
            .calculator
            .compute_settlement_value(form.amount, rate, self.conversion_factor());

        Ok((coin, value))
    }
}

#[async_trait]
impl TradeExecutor for ExchangeDesk {
    async fn execute_trade(&self, form: &ExchangeFormData) -> ExecutionResult<()> {
        let (coin, value) = self.quote(form)?;
        log::info!(
            "Executing sale of {} {} for {} {}",
            form.amount,
            coin.coin_type,
            value,
            self.settings.ledger_currency
        );

        tokio::time::sleep(self.settings.execution_latency).await;

        // balance may have moved while the trade was settling
        let updated = lock(&self.balances).apply_sale(coin.coin_type, form.amount)?;

        let transaction = lock(&self.transactions).record(NewTransaction {
            timestamp: chrono::Utc::now(),
            platform: self.settings.default_platform,
            coin: coin.coin_type,
            kind: TransactionType::Sell,
            amount: form.amount,
            value,
            status: TransactionStatus::Completed,
        });

        log::info!(
            "Trade {} settled, {} balance now {}",
            transaction.id,
            updated.coin_type,
            updated.balance
        );
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
