//! Process-wide `tracing` setup.
//!
//! Events go to stderr so JSON-lines output on stdout stays clean. `RUST_LOG`
//! takes precedence over the verbosity-derived default level.

use once_cell::sync::OnceCell;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

static INIT: OnceCell<()> = OnceCell::new();

/// Map a `-v` count to a default filter directive.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Later calls are no-ops, as is a call made
/// after some other subscriber was already installed.
pub fn init(verbosity: u8) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init();
    });
}
