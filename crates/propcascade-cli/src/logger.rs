//! Diagnostic output for the CLI
//!
//! The core crate logs through the `log` facade. Installing the subscriber
//! also installs `tracing-subscriber`'s `log` bridge, so those records come
//! out on stderr next to the command's own messages.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for `-v` repetitions: warnings by default, then info, debug, trace
pub fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber; `RUST_LOG`, when set, wins over `-v`
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));

    // A subscriber that is already installed is left in place
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .try_init();
}
