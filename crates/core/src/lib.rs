//! Domain logic for the MU Tracker operations service.
//!
//! This crate has no internal dependencies so both the API binary and the
//! database adapters can share the refresh orchestration, health report and
//! log tail building blocks.

pub mod audit;
pub mod character;
pub mod error;
pub mod hashing;
pub mod health;
pub mod log_tail;
pub mod refresh;
pub mod types;
