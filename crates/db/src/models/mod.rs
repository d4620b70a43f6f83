//! Row models and DTOs.

pub mod activity_log;
pub mod character;
