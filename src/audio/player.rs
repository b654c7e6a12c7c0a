use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::PlaybackSettings;

use super::resource::Backend;
use super::thread::{Channels, Msg, spawn_audio_thread, spawn_rodio_thread};
use super::types::{AudioCmd, PlaybackHandle, PlaybackSnapshot, PlayerEvent};

/// The audio thread is no longer accepting commands.
#[derive(Debug, thiserror::Error)]
#[error("audio thread has exited")]
pub struct PlayerGone;

pub struct AudioPlayer {
    tx: Sender<Msg>,
    playback: PlaybackHandle,
    events: Mutex<Receiver<PlayerEvent>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Start playback on the default output device.
    pub fn new(settings: &PlaybackSettings) -> Self {
        Self::start(settings, spawn_rodio_thread)
    }

    /// Start playback through a custom backend.
    pub fn with_backend<B: Backend>(backend: B, settings: &PlaybackSettings) -> Self {
        Self::start(settings, move |channels| spawn_audio_thread(backend, channels))
    }

    fn start(
        settings: &PlaybackSettings,
        spawn: impl FnOnce(Channels) -> JoinHandle<()>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Msg>();
        let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackSnapshot::default()));

        let audio_handle = spawn(Channels {
            tx: tx.clone(),
            rx,
            playback: playback.clone(),
            events: event_tx,
            progress_interval: Duration::from_millis(settings.progress_interval_ms.max(1)),
        });

        Self {
            tx,
            playback,
            events: Mutex::new(event_rx),
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), PlayerGone> {
        self.tx.send(Msg::Cmd(cmd)).map_err(|_| PlayerGone)
    }

    /// Next pending notification, if any.
    pub fn try_event(&self) -> Option<PlayerEvent> {
        self.events.lock().ok()?.try_recv().ok()
    }

    /// Release the active track and wait for the audio thread to finish.
    pub fn quit(&self) {
        let _ = self.send(AudioCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.quit();
    }
}
