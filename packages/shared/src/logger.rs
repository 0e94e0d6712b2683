//! Logging setup for Kakehashi binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log target of the server library crate
const LIBRARY_TARGET: &str = "kakehashi_server";

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the server library crate and the binary itself. It can be
/// overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "kakehashi-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn")
///
/// # Examples
///
/// ```no_run
/// use kakehashi_shared::logger::setup_logger;
///
/// setup_logger("kakehashi-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
///
/// Each target appears once, even when the binary shares the library's crate name.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    let mut targets = vec![LIBRARY_TARGET];
    if binary != LIBRARY_TARGET {
        targets.push(binary.as_str());
    }
    targets.push("tower_http");

    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}
