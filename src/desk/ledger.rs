// src/desk/ledger.rs
use crate::domain::models::{
    CoinType, Platform, Transaction, TransactionStatus, TransactionType,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Append-only transaction history, newest first
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>,
}

/// Fields of a transaction before the log assigns its id
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub timestamp: DateTime<Utc>,
    pub platform: Platform,
    pub coin: CoinType,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub value: Decimal,
    pub status: TransactionStatus,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from historical records in any order
    pub fn with_history(mut history: Vec<Transaction>) -> Self {
        // stable, so equal timestamps keep their input order
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            entries: history.into(),
        }
    }

    /// Prepend a new transaction and return it with its assigned id
    pub fn record(&mut self, new: NewTransaction) -> Transaction {
        let transaction = Transaction {
            id: self.next_id(),
            timestamp: new.timestamp,
            platform: new.platform,
            coin: new.coin,
            kind: new.kind,
            amount: new.amount,
            value: new.value,
            status: new.status,
        };

        log::debug!("Recording transaction {}", transaction.id);
        self.entries.push_front(transaction.clone());
        transaction
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    /// Transactions visible under a platform tab, newest first
    pub fn filter(&self, platform: Platform) -> Vec<&Transaction> {
        self.entries
            .iter()
            .filter(|t| platform.matches(t.platform))
            .collect()
    }

    fn next_id(&self) -> String {
        let mut candidate = self.entries.len() + 1;
        // seeded history may already use the next sequential id
        while self.entries.iter().any(|t| t.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
