#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod dump;
pub mod error;

use tracing_subscriber::EnvFilter;

pub use cli::run_from_env;
pub use error::{CliError, Result};

/// Install the stderr subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
