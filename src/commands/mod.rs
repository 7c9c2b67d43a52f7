//! Command implementations.

pub mod genconfig;
pub mod generate;
