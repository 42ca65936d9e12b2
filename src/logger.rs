//! Logging setup for the verification binary
//!
//! The numeric core never logs. Only the verification layer emits events, so a
//! subscriber is needed only by executables that run it.

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        SubscriberBuilder,
        format::{DefaultFields, Format, Full},
        time::SystemTime,
    },
};

use crate::error::{So3Error, So3Result};

/// Initialize the tracing subscriber with the default INFO level.
///
/// The level can be overridden through `RUST_LOG`:
/// ```bash
/// RUST_LOG=debug cargo run --bin verify_so3
/// RUST_LOG=so3_manifold::verification=trace cargo run --bin verify_so3
/// ```
///
/// # Panics
/// Panics if a global subscriber has already been installed. Use
/// [`try_init_logger_with_level`] when that can happen.
///
/// # Example
/// ```no_run
/// use so3_manifold::init_logger;
///
/// fn main() {
///     init_logger();
///     tracing::info!("verification started");
/// }
/// ```
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level.
///
/// # Arguments
/// * `default_level` - The default log level (overrideable via RUST_LOG)
pub fn init_logger_with_level(default_level: Level) {
    builder(default_level).init();
}

/// Like [`init_logger_with_level`], but reports an already-installed subscriber
/// as an error instead of panicking.
pub fn try_init_logger_with_level(default_level: Level) -> So3Result<()> {
    builder(default_level)
        .try_init()
        .map_err(|e| So3Error::Logging(e.to_string()))
}

fn builder(
    default_level: Level,
) -> SubscriberBuilder<DefaultFields, Format<Full, SystemTime>, EnvFilter> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        // [date time LEVEL target: message]
        .with_timer(SystemTime)
        .with_target(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
}
