//! Diagnostic logging setup.
//!
//! User-facing lines go through [`crate::output`]; `tracing` carries the
//! debug detail (config resolution, per-file writes) to stderr.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "mathop_gen=debug,warn"
    } else {
        "mathop_gen=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. from tests) is ignored.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
