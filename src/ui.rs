//! UI rendering for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Pane};
use crate::audio::{PlaybackSnapshot, PlaybackState};
use crate::config::UiSettings;
use crate::library::SortDirection;

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step: u64) -> String {
    [
        "[j/k] up/down".to_string(),
        "[tab] switch pane".to_string(),
        "[enter] open/play".to_string(),
        "[space] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[H/L] seek -/+{seek_step}s"),
        "[0-9] jump".to_string(),
        "[x] stop".to_string(),
        "[s] sort".to_string(),
        "[o] open dir".to_string(),
        "[R] rescan".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format seconds as `MM:SS`.
fn format_mmss(seconds: f64) -> String {
    let secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn now_playing_text(snapshot: &PlaybackSnapshot) -> String {
    let mut parts = vec![snapshot.state.label().to_string()];

    if let Some(track) = &snapshot.track {
        let mut song = track.name.clone();
        if let Some(artist) = track.artist.as_deref().filter(|a| !a.is_empty()) {
            song = format!("{artist} - {song}");
        }
        parts.push(song);

        if snapshot.state != PlaybackState::Loading {
            let total = if snapshot.duration > 0.0 {
                format_mmss(snapshot.duration)
            } else {
                "--:--".to_string()
            };
            parts.push(format!("{} / {}", format_mmss(snapshot.position), total));
        }
        if let Some(index) = snapshot.index {
            parts.push(format!("{}/{}", index + 1, snapshot.queue_len));
        }
    }

    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, seek_step: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    // Status box
    let snapshot = app.snapshot();
    let mut status = now_playing_text(&snapshot);
    if app.scanning {
        status.push_str(" • scanning…");
    }
    if let Some(msg) = &app.status {
        status.push_str(" • ");
        status.push_str(msg);
    }
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);

    // Folders
    {
        let folders = app.library.folders();
        let items: Vec<ListItem> = folders
            .iter()
            .map(|f| {
                let item = ListItem::new(f.name.as_str());
                if app.library.is_selected(&f.path) {
                    item.style(Style::default().add_modifier(Modifier::UNDERLINED))
                } else {
                    item
                }
            })
            .collect();
        let list = List::new(items)
            .block(pane_block(
                format!(" folders ({}) ", folders.len()),
                app.focus == Pane::Folders,
            ))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !folders.is_empty() {
            state.select(Some(app.folder_cursor));
        }
        frame.render_stateful_widget(list, panes[0], &mut state);
    }

    // Tracks
    {
        let selection = app.library.selection();
        let tracks = app.library.tracks();
        let playing = snapshot.track.as_ref().map(|t| t.path.as_path());
        let items: Vec<ListItem> = tracks
            .iter()
            .map(|t| {
                let marker = if playing == Some(t.path.as_path()) {
                    "♪ "
                } else {
                    "  "
                };
                ListItem::new(format!("{marker}{}", t.name))
            })
            .collect();

        let title = match selection {
            Some(s) if s.loading => format!(" {} (loading…) ", s.folder.name),
            Some(s) => {
                let order = match s.sort {
                    Some(SortDirection::Ascending) => " A→Z",
                    Some(SortDirection::Descending) => " Z→A",
                    None => "",
                };
                format!(" {} ({}){order} ", s.folder.name, tracks.len())
            }
            None => " tracks ".to_string(),
        };
        let list = List::new(items)
            .block(pane_block(title, app.focus == Pane::Tracks))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if !tracks.is_empty() {
            state.select(Some(app.track_cursor));
        }
        frame.render_stateful_widget(list, panes[1], &mut state);
    }

    // Directory prompt overlay
    if let Some(input) = &app.prompt {
        let popup_area = centered_rect_sized(64, 3, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let prompt = Paragraph::new(format!("{input}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" open directory (enter confirms, esc cancels) "),
        );
        frame.render_widget(prompt, popup_area);
    }

    let footer = Paragraph::new(controls_text(seek_step))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
