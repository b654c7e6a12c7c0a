use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::logging;

mod event_loop;
mod settings;
mod startup;
mod workers;

use startup::{StartupArgs, USAGE};
use workers::LibraryMsg;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = match StartupArgs::parse(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return Ok(());
        }
        Err(msg) => return Err(format!("{msg}\n{USAGE}").into()),
    };

    let (settings, fallback) = settings::load_settings();
    match logging::init_tracing(&settings.log) {
        Ok(Some(path)) => tracing::info!(log = %path.display(), "audioflow starting"),
        Ok(None) => {}
        Err(e) => eprintln!("audioflow: logging disabled: {e}"),
    }
    if let Some(reason) = fallback {
        tracing::warn!(%reason, "running with default settings");
    }

    let audio_player = AudioPlayer::new(&settings.playback);
    let mut app = App::new();
    app.set_playback_handle(audio_player.playback_handle());

    let (library_tx, library_rx) = mpsc::channel::<LibraryMsg>();
    startup::begin(&mut app, &settings, &args, &library_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ctx = event_loop::Context {
        settings: &settings,
        player: &audio_player,
        library_tx: &library_tx,
    };
    let run_result = event_loop::run(&mut terminal, &mut app, &ctx, &library_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    audio_player.quit();
    tracing::info!("audioflow exiting");
    run_result
}
