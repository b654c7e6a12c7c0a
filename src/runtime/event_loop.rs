use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Action, App};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::library::LocalFs;
use crate::ui;

use super::workers::{self, LibraryMsg};

/// Everything the key handlers need besides the model itself.
pub struct Context<'a> {
    pub settings: &'a config::Settings,
    pub player: &'a AudioPlayer,
    pub library_tx: &'a mpsc::Sender<LibraryMsg>,
}

impl Context<'_> {
    fn perform(&self, action: Action) {
        match action {
            Action::List(ticket) => {
                workers::spawn_listing(ticket, self.settings.library.clone(), self.library_tx.clone())
            }
            Action::Audio(cmd) => self.send(cmd),
        }
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.player.send(cmd) {
            tracing::error!(error = %e, "dropping audio command");
        }
    }
}

/// Main terminal event loop: drains worker and player results, draws, and
/// handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    ctx: &Context<'_>,
    library_rx: &mpsc::Receiver<LibraryMsg>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(msg) = library_rx.try_recv() {
            match msg {
                LibraryMsg::Catalog { catalog, source } => app.set_catalog(catalog, source),
                LibraryMsg::Listing { ticket, result } => app.finish_listing(&ticket, result),
            }
        }
        while let Some(event) = ctx.player.try_event() {
            app.handle_player_event(event);
        }

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                &ctx.settings.ui,
                ctx.settings.playback.seek_step_seconds,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, ctx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns true when the user asked to quit.
fn handle_key_event(key: KeyEvent, app: &mut App, ctx: &Context<'_>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.prompt.is_some() {
        handle_prompt_key(key, app, ctx);
        return false;
    }

    let step = ctx.settings.playback.seek_step_seconds as f64;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => {
            if let Some(action) = app.activate() {
                ctx.perform(action);
            }
        }
        KeyCode::Char(' ') => ctx.send(AudioCmd::TogglePause),
        KeyCode::Char('h') => ctx.send(AudioCmd::Prev),
        KeyCode::Char('l') => ctx.send(AudioCmd::Next),
        KeyCode::Char('H') => ctx.send(AudioCmd::SeekBy(-step)),
        KeyCode::Char('L') => ctx.send(AudioCmd::SeekBy(step)),
        KeyCode::Char('x') => ctx.send(AudioCmd::Stop),
        KeyCode::Char(c @ '0'..='9') => {
            if let Some(cmd) = c.to_digit(10).and_then(|n| app.seek_to_tenth(n)) {
                ctx.send(cmd);
            }
        }
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('o') => app.open_prompt(),
        KeyCode::Char('R') => {
            if app.begin_rescan() {
                workers::spawn_catalog_load(
                    ctx.settings.library.clone(),
                    ctx.settings.cache.clone(),
                    true,
                    ctx.library_tx.clone(),
                );
            }
        }
        _ => {}
    }
    false
}

fn handle_prompt_key(key: KeyEvent, app: &mut App, ctx: &Context<'_>) {
    let outcome = match key.code {
        KeyCode::Esc => app.close_prompt(false),
        KeyCode::Enter => app.close_prompt(true),
        KeyCode::Backspace => {
            app.prompt_pop();
            return;
        }
        KeyCode::Char(c) => {
            app.prompt_push(c);
            return;
        }
        _ => return,
    };

    let probe = LocalFs::new(ctx.settings.library.follow_links);
    if let Some(action) = app.pick(&probe, outcome) {
        ctx.perform(action);
    }
}
