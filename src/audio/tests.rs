use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::config::PlaybackSettings;
use crate::error::{LoadError, SeekError};
use crate::library::Track;

#[derive(Debug, Default)]
struct Ledger {
    opens: usize,
    stops: usize,
    releases: usize,
}

/// State of one opened fake resource, steerable from the test.
#[derive(Debug, Default)]
struct Knob {
    position: f64,
    finished: bool,
    playing: bool,
}

#[derive(Clone, Default)]
struct FakeBackend {
    ledger: Arc<Mutex<Ledger>>,
    opened: Arc<Mutex<Vec<Arc<Mutex<Knob>>>>>,
    failing: Arc<Mutex<HashSet<PathBuf>>>,
    duration: f64,
    /// How long each open takes.
    delay: Duration,
}

impl FakeBackend {
    fn with_duration(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(PathBuf::from(path));
    }

    fn latest(&self) -> Arc<Mutex<Knob>> {
        self.opened.lock().unwrap().last().cloned().expect("nothing opened yet")
    }

    fn opens(&self) -> usize {
        self.ledger.lock().unwrap().opens
    }

    fn stops(&self) -> usize {
        self.ledger.lock().unwrap().stops
    }

    fn releases(&self) -> usize {
        self.ledger.lock().unwrap().releases
    }
}

impl Backend for FakeBackend {
    type Resource = FakeResource;

    fn open(&self, path: &Path) -> Result<FakeResource, LoadError> {
        thread::sleep(self.delay);
        if self.failing.lock().unwrap().contains(path) {
            return Err(LoadError::Decode {
                path: path.to_path_buf(),
                reason: "not an mp3".into(),
            });
        }
        self.ledger.lock().unwrap().opens += 1;
        let knob = Arc::new(Mutex::new(Knob::default()));
        self.opened.lock().unwrap().push(knob.clone());
        Ok(FakeResource {
            knob,
            ledger: self.ledger.clone(),
            duration: self.duration,
        })
    }
}

struct FakeResource {
    knob: Arc<Mutex<Knob>>,
    ledger: Arc<Mutex<Ledger>>,
    duration: f64,
}

impl Resource for FakeResource {
    fn play(&mut self) {
        self.knob.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.knob.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        self.knob.lock().unwrap().playing = false;
        self.ledger.lock().unwrap().stops += 1;
    }

    fn release(&mut self) {
        self.ledger.lock().unwrap().releases += 1;
    }

    fn seek(&mut self, seconds: f64) -> Result<(), SeekError> {
        self.knob.lock().unwrap().position = seconds;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.knob.lock().unwrap().position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.knob.lock().unwrap().finished
    }
}

fn abc() -> Vec<Track> {
    ["/music/a.mp3", "/music/b.mp3", "/music/c.mp3"]
        .into_iter()
        .map(|p| Track::from_path(Path::new(p)))
        .collect()
}

/// Perform every open the session asks for, like the audio thread would.
fn drive(
    session: &mut Session<FakeResource>,
    backend: &FakeBackend,
    mut request: Option<LoadRequest>,
) -> Result<(), LoadError> {
    while let Some(r) = request.take() {
        let result = backend.open(&r.path);
        request = session.finish_load(r.ticket, result)?;
    }
    Ok(())
}

fn playing_at(backend: &FakeBackend, start: usize) -> Session<FakeResource> {
    let mut session = Session::new();
    let request = session.load_queue(abc(), Some(start));
    drive(&mut session, backend, request).unwrap();
    assert_eq!(session.state(), PlaybackState::Playing);
    session
}

#[test]
fn completion_advances_and_previous_restarts_from_zero() {
    let backend = FakeBackend::with_duration(180.0);
    let mut session = playing_at(&backend, 0);
    assert_eq!(session.current_index(), Some(0));
    assert!(backend.latest().lock().unwrap().playing);

    {
        let knob = backend.latest();
        let mut knob = knob.lock().unwrap();
        knob.position = 179.5;
        knob.finished = true;
    }
    let Some(Completion::Advanced(request)) = session.check_completion() else {
        panic!("expected auto-advance");
    };
    drive(&mut session, &backend, request).unwrap();
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(session.position(), 0.0);

    backend.latest().lock().unwrap().position = 12.0;
    session.sample();
    assert_eq!(session.position(), 12.0);

    let request = session.previous();
    drive(&mut session, &backend, request).unwrap();
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(session.position(), 0.0);
    assert_eq!(session.current_track().unwrap().name, "a.mp3");

    assert_eq!(backend.opens(), 3);
    assert_eq!(backend.releases(), 2);
}

#[test]
fn last_track_completion_stops_then_settles_idle() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = playing_at(&backend, 2);

    backend.latest().lock().unwrap().finished = true;
    assert_eq!(session.check_completion(), Some(Completion::Finished));
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert_eq!(backend.releases(), 1);
    assert_eq!(session.check_completion(), None);

    session.sample();
    assert_eq!(session.state(), PlaybackState::Idle);
    assert_eq!(session.current_index(), None);
    assert_eq!(session.snapshot().queue_len, 3);
}

#[test]
fn seek_clamps_to_track_bounds() {
    let backend = FakeBackend::with_duration(180.0);
    let mut session = playing_at(&backend, 0);

    session.seek(999.0);
    assert_eq!(session.position(), 180.0);
    assert_eq!(backend.latest().lock().unwrap().position, 180.0);

    session.seek(-3.0);
    assert_eq!(session.position(), 0.0);

    session.seek(40.0);
    session.seek_by(-5.0);
    assert_eq!(session.position(), 35.0);
}

#[test]
fn relative_seek_starts_from_the_live_position() {
    let backend = FakeBackend::with_duration(180.0);
    let mut session = playing_at(&backend, 0);
    session.sample();
    assert_eq!(session.position(), 0.0);

    // Playback moved on since the last sample.
    backend.latest().lock().unwrap().position = 100.0;
    session.seek_by(5.0);
    assert_eq!(session.position(), 105.0);
    assert_eq!(backend.latest().lock().unwrap().position, 105.0);

    session.toggle_pause();
    backend.latest().lock().unwrap().position = 150.0;
    session.seek_by(-10.0);
    assert_eq!(session.position(), 140.0);
}

#[test]
fn seek_with_unknown_duration_only_clamps_below() {
    let backend = FakeBackend::with_duration(0.0);
    let mut session = playing_at(&backend, 0);

    session.seek(999.0);
    assert_eq!(session.position(), 999.0);
    session.seek(f64::NAN);
    assert_eq!(session.position(), 0.0);
}

#[test]
fn next_at_last_index_changes_nothing() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = playing_at(&backend, 2);

    assert_eq!(session.next(), None);
    assert_eq!(session.current_index(), Some(2));
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(backend.opens(), 1);
    assert_eq!(backend.releases(), 0);
}

#[test]
fn previous_at_first_index_changes_nothing() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = playing_at(&backend, 0);

    assert_eq!(session.previous(), None);
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn next_and_previous_need_a_current_track() {
    let mut session: Session<FakeResource> = Session::new();
    session.load_queue(abc(), None);
    assert_eq!(session.next(), None);
    assert_eq!(session.previous(), None);
    assert_eq!(session.state(), PlaybackState::Idle);
}

#[test]
fn every_open_is_released_once_idle() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = playing_at(&backend, 0);

    let request = session.play(1);
    drive(&mut session, &backend, request).unwrap();
    let request = session.next();
    drive(&mut session, &backend, request).unwrap();
    session.stop();
    session.sample();
    assert_eq!(session.state(), PlaybackState::Idle);
    assert_eq!(backend.opens(), backend.releases());

    let request = session.load_queue(abc(), Some(1));
    drive(&mut session, &backend, request).unwrap();
    let request = session.load_queue(abc(), None);
    assert_eq!(request, None);
    assert_eq!(session.state(), PlaybackState::Idle);
    assert_eq!(backend.opens(), 4);
    assert_eq!(backend.opens(), backend.releases());
    assert_eq!(backend.stops(), backend.releases());
}

#[test]
fn dropping_the_session_releases_the_live_track() {
    let backend = FakeBackend::with_duration(60.0);
    let session = playing_at(&backend, 1);
    drop(session);
    assert_eq!(backend.releases(), 1);
}

#[test]
fn failed_load_returns_to_idle_with_queue_intact() {
    let backend = FakeBackend::with_duration(60.0);
    backend.fail("/music/b.mp3");
    let mut session = playing_at(&backend, 0);

    let request = session.play(1);
    let err = drive(&mut session, &backend, request).unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }));
    assert_eq!(session.state(), PlaybackState::Idle);
    assert_eq!(session.current_index(), None);
    assert_eq!(session.snapshot().queue_len, 3);
    assert_eq!(backend.opens(), backend.releases());

    let request = session.play(2);
    drive(&mut session, &backend, request).unwrap();
    assert_eq!(session.state(), PlaybackState::Playing);
}

#[test]
fn seek_requested_while_loading_applies_after_load() {
    let backend = FakeBackend::with_duration(180.0);
    let mut session = Session::new();
    let request = session.load_queue(abc(), Some(0));
    assert_eq!(session.state(), PlaybackState::Loading);

    session.seek(30.0);
    session.seek_by(5.0);
    assert_eq!(session.position(), 0.0);

    drive(&mut session, &backend, request).unwrap();
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(session.position(), 35.0);
    assert_eq!(backend.latest().lock().unwrap().position, 35.0);
}

#[test]
fn superseded_load_is_released_and_deferred_request_dispatched() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = Session::new();
    let first = session.load_queue(abc(), Some(0)).unwrap();

    // A second request while the first open is in flight waits its turn.
    assert_eq!(session.play(1), None);
    assert_eq!(session.state(), PlaybackState::Loading);
    assert_eq!(session.current_index(), Some(1));

    let opened = backend.open(&first.path);
    let deferred = session.finish_load(first.ticket, opened).unwrap().unwrap();
    assert_eq!(deferred.index, 1);
    assert_eq!(backend.opens(), 1);
    assert_eq!(backend.releases(), 1);
    assert_eq!(session.state(), PlaybackState::Loading);

    drive(&mut session, &backend, Some(deferred)).unwrap();
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(backend.opens(), 2);
}

#[test]
fn load_finishing_after_stop_is_discarded() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session = Session::new();
    let request = session.load_queue(abc(), Some(0)).unwrap();
    session.stop();
    assert_eq!(session.state(), PlaybackState::Stopped);

    let opened = backend.open(&request.path);
    assert_eq!(session.finish_load(request.ticket, opened).unwrap(), None);
    assert_eq!(session.state(), PlaybackState::Stopped);
    assert_eq!(backend.releases(), 1);
}

#[test]
fn samples_while_loading_or_idle_are_ignored() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session: Session<FakeResource> = Session::new();
    session.sample();
    assert_eq!(session.snapshot(), PlaybackSnapshot::default());

    let request = session.load_queue(abc(), Some(0));
    session.sample();
    assert_eq!(session.state(), PlaybackState::Loading);
    assert_eq!(session.position(), 0.0);
    assert_eq!(session.duration(), 0.0);

    drive(&mut session, &backend, request).unwrap();
    assert_eq!(session.duration(), 60.0);
}

#[test]
fn pause_and_resume_only_act_in_their_state() {
    let backend = FakeBackend::with_duration(60.0);
    let mut session: Session<FakeResource> = Session::new();
    session.pause();
    session.resume();
    assert_eq!(session.state(), PlaybackState::Idle);

    let request = session.load_queue(abc(), Some(0));
    session.pause();
    assert_eq!(session.state(), PlaybackState::Loading);
    drive(&mut session, &backend, request).unwrap();

    session.resume();
    assert_eq!(session.state(), PlaybackState::Playing);

    backend.latest().lock().unwrap().position = 7.0;
    session.toggle_pause();
    assert_eq!(session.state(), PlaybackState::Paused);
    assert_eq!(session.position(), 7.0);
    assert!(!backend.latest().lock().unwrap().playing);

    // Playing the paused track resumes it without reopening.
    assert_eq!(session.play(0), None);
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(backend.opens(), 1);
}

#[test]
fn snapshot_reports_current_track() {
    let backend = FakeBackend::with_duration(90.0);
    let session = playing_at(&backend, 1);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.index, Some(1));
    assert_eq!(snapshot.track.map(|t| t.name), Some("b.mp3".to_string()));
    assert_eq!(snapshot.duration, 90.0);
    assert_eq!(snapshot.queue_len, 3);
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn audio_thread_drives_the_session() {
    let backend = FakeBackend::with_duration(120.0);
    backend.fail("/music/c.mp3");
    let settings = PlaybackSettings {
        progress_interval_ms: 10,
        ..PlaybackSettings::default()
    };
    let player = AudioPlayer::with_backend(backend.clone(), &settings);
    let handle = player.playback_handle();
    let snapshot = || handle.lock().unwrap().clone();

    player
        .send(AudioCmd::LoadQueue {
            tracks: abc(),
            start: Some(0),
        })
        .unwrap();
    assert!(wait_for(|| snapshot().state == PlaybackState::Playing));
    assert_eq!(snapshot().index, Some(0));

    backend.latest().lock().unwrap().position = 3.0;
    assert!(wait_for(|| snapshot().position == 3.0));

    player.send(AudioCmd::Seek(60.0)).unwrap();
    assert!(wait_for(|| snapshot().position == 60.0));
    assert_eq!(backend.latest().lock().unwrap().position, 60.0);

    backend.latest().lock().unwrap().finished = true;
    assert!(wait_for(|| {
        let s = snapshot();
        s.index == Some(1) && s.state == PlaybackState::Playing
    }));

    player.send(AudioCmd::Next).unwrap();
    let mut event = None;
    assert!(wait_for(|| {
        event = player.try_event();
        event.is_some()
    }));
    assert_eq!(
        event,
        Some(PlayerEvent::LoadFailed {
            path: PathBuf::from("/music/c.mp3"),
            message: "cannot decode /music/c.mp3: not an mp3".to_string(),
        })
    );
    assert!(wait_for(|| snapshot().state == PlaybackState::Idle));
    assert_eq!(snapshot().queue_len, 3);

    player.quit();
    assert!(player.send(AudioCmd::Stop).is_err());
    assert_eq!(backend.opens(), 2);
    assert_eq!(backend.opens(), backend.releases());
}

#[test]
fn quitting_during_an_open_releases_the_late_track() {
    let backend = FakeBackend {
        delay: Duration::from_millis(100),
        ..FakeBackend::with_duration(60.0)
    };
    let player = AudioPlayer::with_backend(backend.clone(), &PlaybackSettings::default());

    player
        .send(AudioCmd::LoadQueue {
            tracks: abc(),
            start: Some(0),
        })
        .unwrap();
    player.quit();

    assert_eq!(backend.opens(), 1);
    assert_eq!(backend.stops(), 1);
    assert_eq!(backend.releases(), 1);
}
