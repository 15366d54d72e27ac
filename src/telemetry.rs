use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

pub const LOG_ENV: &str = "MORTGAGE_SIM_LOG";
const DEFAULT_FILTER: &str = "mortgage_sim=info";

/// Installs the global subscriber. Reads `MORTGAGE_SIM_LOG` (EnvFilter syntax,
/// e.g. `mortgage_sim::core=debug`) and falls back to `mortgage_sim=info`.
///
/// Events go to stderr so `simulate` output on stdout stays valid JSON.
/// Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
