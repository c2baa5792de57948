// src/desk/balances.rs
use crate::domain::errors::{ExecutionError, ExecutionResult};
use crate::domain::models::{CoinBalance, CoinType};
use rust_decimal::Decimal;

/// Ordered set of coin balances shown as cards on the dashboard
#[derive(Debug, Clone, Default)]
pub struct BalanceBook {
    coins: Vec<CoinBalance>,
}

impl BalanceBook {
    pub fn new(coins: Vec<CoinBalance>) -> Self {
        let mut book = Self::default();
        book.replace_all(coins);
        book
    }

    pub fn get(&self, coin: CoinType) -> Option<&CoinBalance> {
        self.coins.iter().find(|b| b.coin_type == coin)
    }

    pub fn snapshot(&self) -> Vec<CoinBalance> {
        self.coins.clone()
    }

    /// Replace every balance with a fresh copy from the feed.
    /// Later duplicates of a coin win over earlier ones.
    pub fn replace_all(&mut self, coins: Vec<CoinBalance>) {
        let mut deduped: Vec<CoinBalance> = Vec::with_capacity(coins.len());
        for coin in coins {
            match deduped.iter_mut().find(|b| b.coin_type == coin.coin_type) {
                Some(existing) => *existing = coin,
                None => deduped.push(coin),
            }
        }
        self.coins = deduped;
    }

    /// Take rates and 24h change from a feed, leaving holdings untouched.
    ///
    /// Coins the book does not hold yet are added as reported. Returns how many coins were
    /// updated or added.
    pub fn apply_rates(&mut self, quotes: &[CoinBalance]) -> usize {
        let mut applied = 0;
        for quote in quotes {
            match self.coins.iter_mut().find(|b| b.coin_type == quote.coin_type) {
                Some(existing) => {
                    existing.current_rate = quote.current_rate;
                    existing.change = quote.change;
                }
                None => self.coins.push(quote.clone()),
            }
            applied += 1;
        }
        applied
    }

    /// Deduct a sold amount from a coin, flooring balance and excess at zero
    pub fn apply_sale(&mut self, coin: CoinType, amount: Decimal) -> ExecutionResult<CoinBalance> {
        let entry = self
            .coins
            .iter_mut()
            .find(|b| b.coin_type == coin)
            .ok_or(ExecutionError::UnknownCoin(coin))?;

        if amount > entry.balance {
            return Err(ExecutionError::InsufficientBalance {
                coin,
                requested: amount,
                available: entry.balance,
            });
        }

        entry.deduct(amount);
        Ok(entry.clone())
    }

    /// Sum of every coin valued at its current rate, in the quote currency
    pub fn total_value(&self) -> Decimal {
        self.coins
            .iter()
            .map(|b| b.balance * b.current_rate)
            .sum()
    }
}
