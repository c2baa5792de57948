// src/trading/mod.rs
pub mod calculator;
pub mod form;

pub use calculator::{ExchangeCalculator, ValidationPolicy};
pub use form::{ExchangeFormController, FormField, FormPhase};
