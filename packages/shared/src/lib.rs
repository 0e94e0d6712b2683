//! Utilities shared between Kakehashi packages.

pub mod logger;
pub mod time;
