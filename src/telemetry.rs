//! Telemetry initialization.
//!
//! Controlled by two environment variables:
//! - `RUST_LOG` → event filter (default `warn`)
//! - `WEBXML_LOG_FORMAT=json` → JSON events to stderr; anything else →
//!   compact human-readable lines to stderr
//!
//! Stdout is reserved for command output (merged documents, JSON reports).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "WEBXML_LOG_FORMAT";

/// Install the global subscriber. Call once, at the top of `main()`.
pub fn init() {
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        init_json();
    } else {
        init_text();
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// JSON events to stderr via tracing-subscriber's JSON formatter.
fn init_json() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .init();
}

fn init_text() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
