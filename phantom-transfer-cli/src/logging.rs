//! Log output for the terminal front-end.

use tracing_subscriber::{fmt, EnvFilter};

/// Env var that switches log lines to JSON when set to `1`.
pub const LOG_JSON_ENV: &str = "PHANTOM_TRANSFER_LOG_JSON";

/// Installs the global subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Output goes to stderr
/// so log lines never interleave with the menu on stdout; set
/// `PHANTOM_TRANSFER_LOG_JSON=1` for one JSON object per line.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json_requested(std::env::var(LOG_JSON_ENV).ok().as_deref()) {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Global subscriber already set");
    }
}

fn json_requested(value: Option<&str>) -> bool {
    value == Some("1")
}
