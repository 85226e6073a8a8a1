//! Log output setup.
//!
//! The filter directive comes from the `[logging]` config section so a
//! paper run can turn up strategy modules (`xemm_strategy=trace`) without
//! touching the environment; `XEMM_LOG` overrides it when set. Note the
//! per-decision log classes (order creation, removal, hedges) are gated
//! separately by the strategy's `logging_options` bitmask — the filter
//! here only sets levels per module.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let filter = std::env::var("XEMM_LOG")
        .ok()
        .and_then(|directive| EnvFilter::try_new(&directive).ok())
        .unwrap_or_else(|| EnvFilter::new(&config.filter));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_target(true))
            .init();
    }
}
