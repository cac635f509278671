//! Command-line host for a single wallet

pub mod commands;

pub use commands::*;
