//! Tracing setup.
//!
//! Filter precedence: `RUST_LOG`, then `SEAT_LOG_LEVEL`, then the config
//! `log_level`, then `warn`. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "SEAT_LOG_LEVEL";
const DEFAULT_LEVEL: &str = "warn";

/// Picks the filter directive from the candidate sources.
fn directive(rust_log: Option<String>, seat_log: Option<String>, config: Option<&str>) -> String {
    rust_log
        .into_iter()
        .chain(seat_log)
        .chain(config.map(str::to_string))
        .find(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

pub fn init(config_level: Option<&str>, json: bool) {
    let directive = directive(
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        std::env::var(LOG_LEVEL_ENV).ok(),
        config_level,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
