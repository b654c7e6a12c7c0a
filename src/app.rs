//! Application module: the model the TUI renders and the runtime drives.

mod model;

pub use model::*;
