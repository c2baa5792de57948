// src/domain/errors.rs
use crate::domain::models::CoinType;
use crate::format::{format_coin_amount, format_currency};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by the trade-execution collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Trade rejected: {0}")]
    Rejected(String),

    #[error("Unknown coin: {0}")]
    UnknownCoin(CoinType),

    #[error("Insufficient balance: requested {requested} {coin}, available {available}")]
    InsufficientBalance {
        coin: CoinType,
        requested: Decimal,
        available: Decimal,
    },

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

/// Reasons the exchange form controller refuses an action
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("A submission is already in flight")]
    AlreadySubmitting,

    #[error("Form is not valid for submission")]
    InvalidForm,

    #[error("Form is closed")]
    Closed,

    #[error("No submission is in flight")]
    NotSubmitting,

    #[error("Cannot exchange {0} for itself")]
    SelfExchange(CoinType),

    #[error("No balance for coin {0}")]
    UnknownCoin(CoinType),

    #[error("Trade execution failed: {0}")]
    Execution(#[from] ExecutionError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Balance feed error: {0}")]
    Feed(String),
}

/// How a validation issue affects submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Submission is refused while the issue is present
    Blocking,
    /// Shown to the user but does not prevent submission
    Advisory,
}

/// Field validation outcome. These are values attached to form state, never raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("Amount exceeds available balance of {}", format_coin_amount(*.balance, *.coin))]
    ExceedsBalance { coin: CoinType, balance: Decimal },

    #[error("Consider using amount closer to excess coin: {}", format_coin_amount(*.excess_coin, *.coin))]
    ExceedsExcessGuidance { coin: CoinType, excess_coin: Decimal },

    #[error("Rate should be within {}% of market rate: {}", .tolerance_percent, format_currency(*.market_rate, .quote_currency))]
    RateOutOfBand {
        market_rate: Decimal,
        tolerance_percent: Decimal,
        quote_currency: String,
    },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::ExceedsBalance { .. } => Severity::Blocking,
            ValidationIssue::ExceedsExcessGuidance { .. } => Severity::Advisory,
            ValidationIssue::RateOutOfBand { .. } => Severity::Blocking,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::Blocking
    }
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type ExecutionResult<T> = Result<T, ExecutionError>;
pub type FormResult<T> = Result<T, FormError>;
pub type ScheduleResult<T> = Result<T, ScheduleError>;
pub type ValidationResult = Result<(), ValidationIssue>;
