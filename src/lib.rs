// src/lib.rs
// Main library module declarations

pub mod config;
pub mod desk;
pub mod domain;
pub mod exchange;
pub mod format;
pub mod schedule;
pub mod trading;
