//! Tracing subscriber setup shared by every growbox binary.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Optional path of a file that receives a copy of all log output.
pub const LOG_FILE_VAR: &str = "GROWBOX_LOG_FILE";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `default_filter`. When [`LOG_FILE_VAR`] names a
/// writable file, log lines are appended there as well as to stdout.
pub fn init(default_filter: &str) {
    let file_layer = std::env::var(LOG_FILE_VAR).ok().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            ),
            Err(e) => {
                eprintln!("cannot open log file {path}: {e}");
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
}
