//! Tracing setup. The terminal belongs to the TUI, so events go to a file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LogSettings};

/// Install the global subscriber, honouring `RUST_LOG` over `log.level`.
///
/// Returns the file being written, or `None` when no log location could be
/// resolved, in which case events are discarded.
pub fn init_tracing(settings: &LogSettings) -> io::Result<Option<PathBuf>> {
    let Some(path) = settings.resolved_file() else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);
    let writer = Mutex::new(file);

    // A second initialisation (tests, re-entry) keeps the first subscriber.
    let _ = match settings.format {
        LogFormat::Json => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer),
            )
            .try_init(),
    };

    Ok(Some(path))
}
