use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::LoadError;

use super::resource::{Backend, Resource};
use super::session::{Completion, LoadRequest, Session};
use super::sink::{NoOutput, RodioBackend};
use super::types::{AudioCmd, PlaybackHandle, PlayerEvent};

/// Upper bound on how long the loop sleeps between completion checks.
const POLL: Duration = Duration::from_millis(200);
/// How long shutdown waits for opens that were still running.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub(super) enum Msg {
    Cmd(AudioCmd),
    Loaded {
        ticket: u64,
        path: PathBuf,
        result: Result<Box<dyn Resource>, LoadError>,
    },
}

pub(super) struct Channels {
    pub tx: Sender<Msg>,
    pub rx: Receiver<Msg>,
    pub playback: PlaybackHandle,
    pub events: Sender<PlayerEvent>,
    pub progress_interval: Duration,
}

/// Spawn the audio thread on the default output device. When the device
/// cannot be opened the thread still runs, failing every load.
pub(super) fn spawn_rodio_thread(channels: Channels) -> JoinHandle<()> {
    thread::spawn(move || match RodioBackend::open_default() {
        Ok((_stream, backend)) => run_audio_loop(backend, channels),
        Err(e) => {
            tracing::error!(error = %e, "audio output unavailable");
            run_audio_loop(NoOutput::new(e.to_string()), channels);
        }
    })
}

pub(super) fn spawn_audio_thread<B: Backend>(backend: B, channels: Channels) -> JoinHandle<()> {
    thread::spawn(move || run_audio_loop(backend, channels))
}

fn run_audio_loop<B: Backend>(backend: B, channels: Channels) {
    let Channels {
        tx,
        rx,
        playback,
        events,
        progress_interval,
    } = channels;

    let mut session: Session<Box<dyn Resource>> = Session::new();
    let mut last_sample = Instant::now();
    // Opens handed to loader threads whose result has not come back yet.
    let mut outstanding = 0usize;

    loop {
        let wait = progress_interval
            .saturating_sub(last_sample.elapsed())
            .min(POLL);

        let next_load = match rx.recv_timeout(wait) {
            Ok(Msg::Cmd(AudioCmd::Quit)) => break,
            Ok(Msg::Cmd(cmd)) => apply(&mut session, cmd),
            Ok(Msg::Loaded {
                ticket,
                path,
                result,
            }) => {
                outstanding = outstanding.saturating_sub(1);
                match session.finish_load(ticket, result) {
                    Ok(request) => request,
                    Err(e) => {
                        let _ = events.send(PlayerEvent::LoadFailed {
                            path,
                            message: e.to_string(),
                        });
                        None
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if let Some(request) = next_load {
            dispatch(&backend, &tx, request);
            outstanding += 1;
        }

        match session.check_completion() {
            Some(Completion::Advanced(Some(request))) => {
                dispatch(&backend, &tx, request);
                outstanding += 1;
            }
            Some(Completion::Finished) => {
                tracing::info!("reached end of queue");
                let _ = events.send(PlayerEvent::QueueFinished);
            }
            Some(Completion::Advanced(None)) | None => {}
        }

        if last_sample.elapsed() >= progress_interval {
            session.sample();
            last_sample = Instant::now();
        }
        publish(&playback, &session);
    }

    session.shutdown();
    drain_loads(&rx, &mut session, outstanding);
    publish(&playback, &session);
    tracing::debug!("audio thread exiting");
}

/// Collect results of opens still running at shutdown. The session is idle by
/// now, so each one arrives stale and is stopped and released.
fn drain_loads(rx: &Receiver<Msg>, session: &mut Session<Box<dyn Resource>>, mut outstanding: usize) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    while outstanding > 0 {
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(Msg::Loaded { ticket, result, .. }) => {
                outstanding -= 1;
                let _ = session.finish_load(ticket, result);
            }
            Ok(Msg::Cmd(_)) => {}
            Err(_) => break,
        }
    }
    if outstanding > 0 {
        tracing::warn!(outstanding, "gave up waiting for track opens at exit");
    }
}

fn apply(session: &mut Session<Box<dyn Resource>>, cmd: AudioCmd) -> Option<LoadRequest> {
    match cmd {
        AudioCmd::LoadQueue { tracks, start } => session.load_queue(tracks, start),
        AudioCmd::Play(index) => session.play(index),
        AudioCmd::TogglePause => {
            session.toggle_pause();
            None
        }
        AudioCmd::Stop => {
            session.stop();
            None
        }
        AudioCmd::Seek(seconds) => {
            session.seek(seconds);
            None
        }
        AudioCmd::SeekBy(delta) => {
            session.seek_by(delta);
            None
        }
        AudioCmd::Next => session.next(),
        AudioCmd::Prev => session.previous(),
        AudioCmd::Quit => None,
    }
}

/// Open `request` off the audio thread; the result comes back as a message.
fn dispatch<B: Backend>(backend: &B, tx: &Sender<Msg>, request: LoadRequest) {
    let backend = backend.clone();
    let tx = tx.clone();
    thread::spawn(move || {
        let LoadRequest { ticket, index, path } = request;
        tracing::debug!(ticket, index, path = %path.display(), "opening track");
        let result = backend
            .open(&path)
            .map(|resource| Box::new(resource) as Box<dyn Resource>);
        // The audio thread may already be gone; the resource is dropped then.
        let _ = tx.send(Msg::Loaded {
            ticket,
            path,
            result,
        });
    });
}

fn publish(playback: &PlaybackHandle, session: &Session<Box<dyn Resource>>) {
    if let Ok(mut snapshot) = playback.lock() {
        *snapshot = session.snapshot();
    }
}
