//! AIR Members command-line front end
//!
//! Thin presentation layer over `air-sdk`: configuration from flags and
//! environment, logging setup, and one subcommand per member operation.

pub mod commands;
pub mod config;

pub use commands::{run, Command};
pub use config::Args;
