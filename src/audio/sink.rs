//! `rodio` playback resources.
//!
//! Each opened track gets its own paused `Sink` on the shared output mixer.
//! Track length comes from the decoder when it knows it, otherwise from the
//! file's properties as read by `lofty`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::{LoadError, SeekError};

use super::resource::{Backend, Resource};

#[derive(Clone)]
pub struct RodioBackend {
    mixer: Mixer,
}

impl RodioBackend {
    /// Open the default output device. The returned stream must outlive
    /// every resource opened through the backend.
    pub fn open_default() -> Result<(OutputStream, Self), LoadError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| LoadError::NoOutput(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which tears the TUI.
        stream.log_on_drop(false);
        let mixer = stream.mixer().clone();
        Ok((stream, Self { mixer }))
    }
}

impl Backend for RodioBackend {
    type Resource = RodioResource;

    fn open(&self, path: &Path) -> Result<RodioResource, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| LoadError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let duration = decoder
            .total_duration()
            .or_else(|| tagged_duration(path))
            .map_or(0.0, |d| d.as_secs_f64());

        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        sink.append(decoder);
        tracing::debug!(path = %path.display(), duration, "opened track");
        Ok(RodioResource { sink, duration })
    }
}

fn tagged_duration(path: &Path) -> Option<Duration> {
    let file = lofty::read_from_path(path).ok()?;
    let duration = file.properties().duration();
    (!duration.is_zero()).then_some(duration)
}

pub struct RodioResource {
    sink: Sink,
    duration: f64,
}

impl Resource for RodioResource {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn release(&mut self) {
        self.sink.clear();
    }

    fn seek(&mut self, seconds: f64) -> Result<(), SeekError> {
        self.sink
            .try_seek(Duration::from_secs_f64(seconds.max(0.0)))
            .map_err(|e| SeekError {
                target: seconds,
                reason: e.to_string(),
            })
    }

    fn position(&self) -> f64 {
        self.sink.get_pos().as_secs_f64()
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

/// Stand-in used when no output device could be opened: every load fails
/// with the device error so the rest of the app keeps working.
#[derive(Clone)]
pub struct NoOutput {
    reason: String,
}

impl NoOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Backend for NoOutput {
    type Resource = Box<dyn Resource>;

    fn open(&self, _path: &Path) -> Result<Box<dyn Resource>, LoadError> {
        Err(LoadError::NoOutput(self.reason.clone()))
    }
}
