//! Logging setup for the `tabula` binary

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map `-v` occurrences to a level: none is warn, then info, debug, trace
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    // Allow RUST_LOG to override the configured level
    let level_str = level.as_str().to_lowercase();
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Other crates stay at warn
        EnvFilter::new(format!("warn,tabula={level}", level = level_str))
    })
}

/// Install a compact stderr subscriber. Calling it twice is harmless; the
/// first subscriber stays in place.
pub fn init_logging(verbose: u8) {
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(level_for_verbosity(verbose)))
        .with(layer)
        .try_init();
}
