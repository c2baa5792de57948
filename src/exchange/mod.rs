// src/exchange/mod.rs
pub mod client;
pub mod simulated;

pub use client::{BalanceFeed, TradeExecutor};
pub use simulated::SimulatedExchange;
