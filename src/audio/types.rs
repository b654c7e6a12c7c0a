//! Audio-related small types and handles.
//!
//! This module defines the transport state, the commands accepted by the
//! audio thread and the snapshot it publishes for the UI.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::library::Track;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No track selected, nothing loaded.
    #[default]
    Idle,
    /// A track was requested and its resource is being opened.
    Loading,
    Playing,
    Paused,
    /// Playback ended or was stopped; settles to `Idle` on the next sample.
    Stopped,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the queue, optionally starting playback at an index.
    LoadQueue {
        tracks: Vec<Track>,
        start: Option<usize>,
    },
    /// Play the queue entry at the given index (resumes if it is the paused track).
    Play(usize),
    /// Toggle pause/resume.
    TogglePause,
    /// Stop playback and release the current track.
    Stop,
    /// Seek to an absolute position in seconds.
    Seek(f64),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(f64),
    /// Skip to the next track.
    Next,
    /// Go to the previous track.
    Prev,
    /// Release everything and end the audio thread.
    Quit,
}

/// Notifications the UI should surface once.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    LoadFailed { path: PathBuf, message: String },
    /// Auto-advance ran past the last track.
    QueueFinished,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Runtime playback information shared with the UI.
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// Index of the current track in the queue (if any).
    pub index: Option<usize>,
    pub track: Option<Track>,
    /// Seconds into the current track.
    pub position: f64,
    /// Length of the current track in seconds, 0 when unknown.
    pub duration: f64,
    pub queue_len: usize,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackSnapshot>>;
