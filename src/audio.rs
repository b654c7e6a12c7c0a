//! Playback: the transport state machine and the thread that drives it.

mod player;
mod resource;
mod session;
mod sink;
mod thread;
mod types;

pub use player::{AudioPlayer, PlayerGone};
pub use resource::{Backend, Resource};
pub use session::{Completion, LoadRequest, Session};
pub use sink::{NoOutput, RodioBackend, RodioResource};
pub use types::{AudioCmd, PlaybackHandle, PlaybackSnapshot, PlaybackState, PlayerEvent};

#[cfg(test)]
mod tests;
