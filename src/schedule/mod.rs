// src/schedule/mod.rs
pub mod refresh;
pub mod shift;

pub use refresh::RefreshScheduler;
pub use shift::{ShiftClock, ShiftState, ShiftTimer};
