//! Subcommand implementations.

pub mod defaults;
pub mod health;
pub mod serve;
