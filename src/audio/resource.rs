//! The seam between the playback session and the engine that actually
//! decodes and outputs audio.

use std::path::Path;

use crate::error::{LoadError, SeekError};

/// One opened, decodable audio stream.
///
/// The session calls `stop` and then `release` exactly once before dropping
/// a resource.
pub trait Resource: Send + 'static {
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn release(&mut self);
    fn seek(&mut self, seconds: f64) -> Result<(), SeekError>;
    fn position(&self) -> f64;
    /// Length in seconds; 0 when the engine cannot tell.
    fn duration(&self) -> f64;
    /// True once the stream played through to its natural end.
    fn is_finished(&self) -> bool;
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn seek(&mut self, seconds: f64) -> Result<(), SeekError> {
        (**self).seek(seconds)
    }

    fn position(&self) -> f64 {
        (**self).position()
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

/// Opens playback resources. Cloned onto the loader thread for each open.
pub trait Backend: Clone + Send + 'static {
    type Resource: Resource;

    fn open(&self, path: &Path) -> Result<Self::Resource, LoadError>;
}
