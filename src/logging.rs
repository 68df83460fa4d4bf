use std::env;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter; setting `LOG_JSON=true` switches to JSON output for production
/// log shipping, otherwise a compact console format is used.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,jamhub=info"))?;

    let json_logging = env::var("LOG_JSON").is_ok_and(|value| value == "true");
    let registry = tracing_subscriber::registry().with(filter);

    if json_logging {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().compact().with_target(true))
            .init();
    }

    Ok(())
}
