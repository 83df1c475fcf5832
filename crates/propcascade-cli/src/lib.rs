//! propcascade CLI library
//!
//! Exposes the CLI entry point so the binary stays a one-liner.

mod cli;
mod logger;

pub use cli::run;
