//! Tracing subscriber setup

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

/// Install the global tracing subscriber
///
/// The filter comes from `service.log_level` and falls back to `info` when the
/// directive does not parse. Output is JSON when `service.log_format` is
/// `json` and pretty otherwise.
pub fn init_tracing(config: &Config) -> Result<()> {
    tracing::subscriber::set_global_default(build_subscriber(config)).map_err(|e| {
        crate::error::Error::Internal(format!("Failed to install tracing subscriber: {}", e))
    })?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

fn build_subscriber(config: &Config) -> BoxedSubscriber {
    let filter = EnvFilter::try_new(&config.service.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.service.log_format.eq_ignore_ascii_case("json") {
        Box::new(
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish(),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .finish(),
        )
    }
}
