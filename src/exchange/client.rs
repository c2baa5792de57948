// src/exchange/client.rs
use crate::domain::errors::{ExecutionResult, ScheduleResult};
use crate::domain::models::{CoinBalance, ExchangeFormData};
use async_trait::async_trait;

/// Executes a submitted exchange form
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Execute the trade described by `form`. Nothing may change on the desk unless this returns `Ok`.
    async fn execute_trade(&self, form: &ExchangeFormData) -> ExecutionResult<()>;
}

/// Source of fresh coin balances for the dashboard
#[async_trait]
pub trait BalanceFeed: Send + Sync {
    /// Produce a refreshed copy of `current`
    async fn refresh(&self, current: &[CoinBalance]) -> ScheduleResult<Vec<CoinBalance>>;
}
