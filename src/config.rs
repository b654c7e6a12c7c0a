//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive the scanner,
//! the playback session and logging, plus helpers to load it from disk.

mod load;
mod schema;

pub use load::default_cache_dir;
pub use schema::*;
