//! Diagnostic logging to stderr.
//!
//! Filtering follows `RUST_LOG` when it is set:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=csvview::diff=trace` - module-level filtering
//!
//! Otherwise only warnings are shown, or debug output with `--debug` /
//! `[debug] enabled = true`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "csvview=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling it a second time is a no-op.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    // stdout carries the rendered page
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(debug)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}
