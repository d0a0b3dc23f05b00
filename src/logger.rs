// src/logger.rs
//! Logging initialisation via tracing-subscriber.

use crate::Error;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber. `RUST_LOG` takes precedence;
/// `level` is the fallback filter. Logs go to stderr so stdout stays
/// clean for rendered output.
pub fn init(level: &str) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| Error::Config(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to set subscriber: {e}")))?;

    Ok(())
}
