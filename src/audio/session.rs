//! Playback session state machine.
//!
//! `Session` owns the track queue, the transport state and the single live
//! playback resource. It performs no I/O of its own: operations that need a
//! track opened hand back a [`LoadRequest`], and whoever drives the session
//! opens the file and reports back through [`Session::finish_load`]. This
//! keeps the state machine testable without an audio device and makes the
//! `Loading` window explicit.
//!
//! Resource lifecycle rules enforced here:
//! - the live resource is stopped and released before a replacement is
//!   requested, so two resources are never live at once;
//! - at most one open is outstanding; a request made while another open is
//!   in flight is deferred until that open reports back;
//! - a load result that was superseded in the meantime is released unused.

use std::path::PathBuf;

use crate::error::LoadError;
use crate::library::Track;

use super::resource::Resource;
use super::types::{PlaybackSnapshot, PlaybackState};

/// Ask the driver to open `path` for queue entry `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub ticket: u64,
    pub index: usize,
    pub path: PathBuf,
}

/// What happened when the active track played to its end.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Moved on to the next entry; carries the open to perform, if any.
    Advanced(Option<LoadRequest>),
    /// The last entry finished; playback is `Stopped`.
    Finished,
}

pub struct Session<R: Resource> {
    queue: Vec<Track>,
    current: Option<usize>,
    state: PlaybackState,
    position: f64,
    duration: f64,
    resource: Option<R>,
    /// Ticket of the most recent load request; older tickets are stale.
    ticket: u64,
    in_flight: Option<u64>,
    deferred: Option<LoadRequest>,
    pending_seek: Option<f64>,
}

impl<R: Resource> Default for Session<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> Session<R> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            state: PlaybackState::Idle,
            position: 0.0,
            duration: 0.0,
            resource: None,
            ticket: 0,
            in_flight: None,
            deferred: None,
            pending_seek: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.queue.get(i))
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            index: self.current,
            track: self.current_track().cloned(),
            position: self.position,
            duration: self.duration,
            queue_len: self.queue.len(),
        }
    }

    /// Replace the queue. Whatever is playing is released first; a load in
    /// flight becomes stale. With `start`, playback of that entry is requested.
    pub fn load_queue(&mut self, tracks: Vec<Track>, start: Option<usize>) -> Option<LoadRequest> {
        self.release_resource();
        self.cancel_load();
        self.queue = tracks;
        self.current = None;
        self.state = PlaybackState::Idle;
        self.position = 0.0;
        self.duration = 0.0;

        match start {
            Some(index) => self.play(index),
            None => None,
        }
    }

    /// Play queue entry `index`. The paused current track resumes in place;
    /// anything else is (re)loaded from the start.
    pub fn play(&mut self, index: usize) -> Option<LoadRequest> {
        if index >= self.queue.len() {
            tracing::warn!(index, queue_len = self.queue.len(), "play index out of range");
            return None;
        }
        if self.current == Some(index) && self.state == PlaybackState::Paused {
            self.resume();
            return None;
        }
        self.request(index)
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
            self.position = resource.position();
        }
        self.state = PlaybackState::Paused;
    }

    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            return;
        }
        if let Some(resource) = self.resource.as_mut() {
            resource.play();
        }
        self.state = PlaybackState::Playing;
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            _ => {}
        }
    }

    /// Release the current track and clear the position. The index is kept
    /// until the next progress sample settles the session to `Idle`.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.release_resource();
        self.cancel_load();
        self.position = 0.0;
        self.state = PlaybackState::Stopped;
    }

    /// Seek to `seconds`, clamped to `[0, duration]`. While loading, the most
    /// recent request is kept and applied once the track is ready.
    pub fn seek(&mut self, seconds: f64) {
        match self.state {
            PlaybackState::Loading => {
                self.pending_seek = Some(non_negative(seconds));
            }
            PlaybackState::Playing | PlaybackState::Paused => {
                let target = self.clamp(seconds);
                if let Some(resource) = self.resource.as_mut() {
                    if let Err(e) = resource.seek(target) {
                        tracing::warn!(error = %e, "seek rejected by playback engine");
                        return;
                    }
                }
                self.position = target;
            }
            PlaybackState::Idle | PlaybackState::Stopped => {}
        }
    }

    /// Seek relative to the live resource position, or to the pending target
    /// while loading.
    pub fn seek_by(&mut self, delta: f64) {
        let base = match (self.state, self.resource.as_ref()) {
            (PlaybackState::Loading, _) => self.pending_seek.unwrap_or(0.0),
            (PlaybackState::Playing | PlaybackState::Paused, Some(resource)) => {
                non_negative(resource.position())
            }
            _ => self.position,
        };
        self.seek(base + delta);
    }

    /// Move to the following entry. No-op at the end of the queue.
    pub fn next(&mut self) -> Option<LoadRequest> {
        let index = self.active_index()?;
        if index + 1 < self.queue.len() {
            self.request(index + 1)
        } else {
            None
        }
    }

    /// Move to the preceding entry, reloading it from the start. No-op at the
    /// head of the queue.
    pub fn previous(&mut self) -> Option<LoadRequest> {
        let index = self.active_index()?;
        if index > 0 {
            self.request(index - 1)
        } else {
            None
        }
    }

    /// Take the result of opening the track for `ticket`.
    ///
    /// A superseded result is released and the deferred request, if any, is
    /// handed back for opening. A failed current load returns the session to
    /// `Idle` with the queue untouched.
    pub fn finish_load(
        &mut self,
        ticket: u64,
        result: Result<R, LoadError>,
    ) -> Result<Option<LoadRequest>, LoadError> {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }

        if ticket != self.ticket || self.state != PlaybackState::Loading {
            tracing::debug!(ticket, "discarding superseded load result");
            if let Ok(mut stale) = result {
                stale.stop();
                stale.release();
            }
            return Ok(self.dispatch_deferred());
        }

        match result {
            Ok(mut resource) => {
                self.duration = non_negative(resource.duration());
                resource.play();
                self.resource = Some(resource);
                self.state = PlaybackState::Playing;
                if let Some(target) = self.pending_seek.take() {
                    self.seek(target);
                }
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "track failed to load");
                self.state = PlaybackState::Idle;
                self.current = None;
                self.position = 0.0;
                self.duration = 0.0;
                Err(e)
            }
        }
    }

    /// Refresh position and duration from the live resource. Skipped while
    /// `Idle` or `Loading`; a `Stopped` session settles to `Idle` here.
    pub fn sample(&mut self) {
        match self.state {
            PlaybackState::Idle | PlaybackState::Loading => {}
            PlaybackState::Stopped => {
                self.state = PlaybackState::Idle;
                self.current = None;
            }
            PlaybackState::Playing | PlaybackState::Paused => {
                if let Some(resource) = self.resource.as_ref() {
                    self.position = non_negative(resource.position());
                    let duration = resource.duration();
                    if duration > 0.0 {
                        self.duration = duration;
                    }
                }
            }
        }
    }

    /// Auto-advance when the playing track reached its natural end.
    pub fn check_completion(&mut self) -> Option<Completion> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        if !self.resource.as_ref().is_some_and(|r| r.is_finished()) {
            return None;
        }

        let index = self.current?;
        if index + 1 < self.queue.len() {
            Some(Completion::Advanced(self.request(index + 1)))
        } else {
            self.release_resource();
            self.position = 0.0;
            self.state = PlaybackState::Stopped;
            Some(Completion::Finished)
        }
    }

    /// Release everything; the session ends `Idle` with its queue intact.
    pub fn shutdown(&mut self) {
        self.release_resource();
        self.cancel_load();
        self.current = None;
        self.position = 0.0;
        self.state = PlaybackState::Idle;
    }

    fn active_index(&self) -> Option<usize> {
        if self.state == PlaybackState::Idle {
            None
        } else {
            self.current
        }
    }

    fn request(&mut self, index: usize) -> Option<LoadRequest> {
        let path = self.queue.get(index)?.path.clone();

        self.release_resource();
        self.ticket += 1;
        self.pending_seek = None;
        self.current = Some(index);
        self.state = PlaybackState::Loading;
        self.position = 0.0;
        self.duration = 0.0;

        let request = LoadRequest {
            ticket: self.ticket,
            index,
            path,
        };
        if self.in_flight.is_some() {
            self.deferred = Some(request);
            None
        } else {
            self.in_flight = Some(request.ticket);
            Some(request)
        }
    }

    fn dispatch_deferred(&mut self) -> Option<LoadRequest> {
        let request = self.deferred.take()?;
        self.in_flight = Some(request.ticket);
        Some(request)
    }

    /// Invalidate any load in flight and forget deferred work.
    fn cancel_load(&mut self) {
        self.ticket += 1;
        self.deferred = None;
        self.pending_seek = None;
    }

    fn release_resource(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.stop();
            resource.release();
        }
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let target = non_negative(seconds);
        if self.duration > 0.0 {
            target.min(self.duration)
        } else {
            target
        }
    }
}

impl<R: Resource> Drop for Session<R> {
    fn drop(&mut self) {
        self.release_resource();
    }
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}
