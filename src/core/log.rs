use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` replaces the default filter when set.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,navfeed={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(filter)
        .init();
}
