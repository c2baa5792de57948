// src/domain/mod.rs
pub mod errors;
pub mod models;

// Re-export common types for convenience
pub use errors::{
    AppError, AppResult, ExecutionError, ExecutionResult, FormError, FormResult, ScheduleError,
    ScheduleResult, Severity, ValidationIssue, ValidationResult,
};
pub use models::{
    CoinBalance, CoinType, ExchangeFormData, Platform, PriceChange, RefreshInterval, Transaction,
    TransactionStatus, TransactionType,
};
