//! Error types shared by the library scanner, the catalog cache and the
//! playback session.
//!
//! Scanner-level filesystem failures are plain `std::io::Error`s that the
//! walker logs and skips; only the errors below ever reach a caller.

use std::io;
use std::path::PathBuf;

/// A folder could not be listed when its tracks were requested.
///
/// The folder may have been removed since the catalog was built; callers
/// show an empty track list instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot list folder {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Unreadable { path, .. } => path,
        }
    }
}

/// A playback resource could not be opened or decoded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("no audio output available: {0}")]
    NoOutput(String),
}

/// The playback engine refused a seek.
#[derive(Debug, thiserror::Error)]
#[error("seek to {target:.1}s failed: {reason}")]
pub struct SeekError {
    pub target: f64,
    pub reason: String,
}

/// Reading or writing the persisted catalog failed.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a directory-pick prompt that did not yield a usable folder.
#[derive(Debug, thiserror::Error)]
pub enum PickError {
    /// The user dismissed the prompt. Not a failure.
    #[error("directory pick cancelled")]
    Cancelled,

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}
