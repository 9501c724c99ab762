//! Command line interface module
//!
//! This module provides argument parsing (flags with environment fallbacks),
//! configuration validation, and the [`Runner`] that drives the periodic
//! reconciliation loop and the health check listener.

pub mod args;
pub mod config;
pub mod runner;

pub use args::Args;
pub use config::{AppConfig, CattleConfig};
pub use runner::Runner;
