//! Application model: what the TUI shows and how key presses map onto the
//! library and the audio thread.
//!
//! `App` never touches the filesystem or the audio device itself. It hands
//! back `Action`s for the runtime to carry out and takes their results.

use std::path::PathBuf;

use crate::audio::{AudioCmd, PlaybackHandle, PlaybackSnapshot, PlayerEvent};
use crate::error::{PickError, ScanError};
use crate::library::{
    Catalog, CatalogSource, FsProbe, Library, ListingTicket, SortDirection, Track,
    parse_picked_path,
};

/// Which list has keyboard focus.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Folders,
    Tracks,
}

/// Work the runtime performs on behalf of the model.
#[derive(Debug)]
pub enum Action {
    /// List the tracks of a newly selected folder.
    List(ListingTicket),
    Audio(AudioCmd),
}

/// The main application model.
#[derive(Default)]
pub struct App {
    pub library: Library,
    pub focus: Pane,
    pub folder_cursor: usize,
    pub track_cursor: usize,
    /// Directory prompt buffer while the prompt is open.
    pub prompt: Option<String>,
    /// One-line message shown in the status bar.
    pub status: Option<String>,
    /// A catalog load or rescan is running.
    pub scanning: bool,
    pub playback_handle: Option<PlaybackHandle>,

    /// Track paths of the queue last handed to the player.
    queued: Vec<PathBuf>,
}

impl App {
    pub fn new() -> Self {
        Self {
            scanning: true,
            ..Self::default()
        }
    }

    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.clone()))
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Install a freshly loaded or rescanned catalog.
    pub fn set_catalog(&mut self, catalog: Catalog, source: CatalogSource) {
        let count = catalog.len();
        self.library.set_catalog(catalog);
        self.folder_cursor = self.folder_cursor.min(count.saturating_sub(1));
        self.scanning = false;
        self.set_status(match source {
            CatalogSource::Cache => format!("{count} folders (cached)"),
            CatalogSource::Scan => format!("{count} folders found"),
        });
    }

    /// Mark a rescan as started. Returns false when one is already running.
    pub fn begin_rescan(&mut self) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;
        self.set_status("rescanning library…");
        true
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Folders => Pane::Tracks,
            Pane::Tracks => Pane::Folders,
        };
    }

    /// Move the cursor of the focused pane down one row.
    pub fn next(&mut self) {
        let (cursor, len) = self.focused_cursor();
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    /// Move the cursor of the focused pane up one row.
    pub fn prev(&mut self) {
        let (cursor, _) = self.focused_cursor();
        *cursor = cursor.saturating_sub(1);
    }

    fn focused_cursor(&mut self) -> (&mut usize, usize) {
        match self.focus {
            Pane::Folders => (&mut self.folder_cursor, self.library.folders().len()),
            Pane::Tracks => (&mut self.track_cursor, self.library.tracks().len()),
        }
    }

    /// `enter`: select the folder under the cursor, or play the track under it.
    pub fn activate(&mut self) -> Option<Action> {
        match self.focus {
            Pane::Folders => {
                let folder = self.library.folders().get(self.folder_cursor)?.clone();
                self.track_cursor = 0;
                self.focus = Pane::Tracks;
                Some(Action::List(self.library.select(folder)))
            }
            Pane::Tracks => self.play_selected().map(Action::Audio),
        }
    }

    /// Play the highlighted track. The displayed list becomes the player's
    /// queue unless the player already holds exactly that list.
    pub fn play_selected(&mut self) -> Option<AudioCmd> {
        let tracks = self.library.tracks();
        if self.track_cursor >= tracks.len() {
            return None;
        }
        if self.is_queued(tracks) {
            return Some(AudioCmd::Play(self.track_cursor));
        }
        let tracks = tracks.to_vec();
        self.queued = tracks.iter().map(|t| t.path.clone()).collect();
        Some(AudioCmd::LoadQueue {
            tracks,
            start: Some(self.track_cursor),
        })
    }

    /// Jump to `tenths` of the way through the current track (0 is the start,
    /// 9 is 90%). Needs a known duration.
    pub fn seek_to_tenth(&self, tenths: u32) -> Option<AudioCmd> {
        let duration = self.snapshot().duration;
        if duration <= 0.0 || tenths > 9 {
            return None;
        }
        Some(AudioCmd::Seek(duration * f64::from(tenths) / 10.0))
    }

    fn is_queued(&self, tracks: &[Track]) -> bool {
        self.queued.len() == tracks.len()
            && self.queued.iter().zip(tracks).all(|(p, t)| *p == t.path)
    }

    /// Apply a finished folder listing.
    pub fn finish_listing(&mut self, ticket: &ListingTicket, result: Result<Vec<Track>, ScanError>) {
        match self.library.finish_listing(ticket, result) {
            Ok(true) => {
                self.track_cursor = 0;
                let count = self.library.tracks().len();
                self.set_status(format!("{} · {count} tracks", ticket.folder.name));
            }
            Ok(false) => {}
            Err(e) => self.set_status(format!("cannot open folder: {}", e.path().display())),
        }
    }

    /// `s`: unsorted -> ascending -> descending -> unsorted.
    pub fn cycle_sort(&mut self) {
        if self.library.selection().is_none() {
            return;
        }
        let sort = self.library.cycle_sort();
        self.track_cursor = 0;
        self.set_status(match sort {
            Some(SortDirection::Ascending) => "sorted A→Z",
            Some(SortDirection::Descending) => "sorted Z→A",
            None => "listing order",
        });
    }

    pub fn open_prompt(&mut self) {
        self.prompt = Some(String::new());
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.push(c);
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.pop();
        }
    }

    /// Close the prompt. `submit` false means the user cancelled.
    pub fn close_prompt(&mut self, submit: bool) -> Result<PathBuf, PickError> {
        let input = self.prompt.take().unwrap_or_default();
        if !submit || input.trim().is_empty() {
            return Err(PickError::Cancelled);
        }
        Ok(parse_picked_path(&input))
    }

    /// Select a picked directory. The picked folder is shown right away and
    /// never enters the catalog.
    pub fn pick<P: FsProbe + ?Sized>(
        &mut self,
        probe: &P,
        outcome: Result<PathBuf, PickError>,
    ) -> Option<Action> {
        match self.library.select_picked(probe, outcome) {
            Ok(Some(ticket)) => {
                self.track_cursor = 0;
                self.focus = Pane::Tracks;
                Some(Action::List(ticket))
            }
            Ok(None) => None,
            Err(e) => {
                self.set_status(e.to_string());
                None
            }
        }
    }

    /// Surface a notification from the audio thread.
    pub fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::LoadFailed { path, .. } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.set_status(format!("cannot play {name}"));
            }
            PlayerEvent::QueueFinished => self.set_status("end of queue"),
        }
    }
}
