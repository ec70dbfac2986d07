use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tabtune_lib::catalog::format_time;
use tabtune_lib::diagnostics::reporter::Report;
use tabtune_lib::library::KeyValueStore;
use tabtune_lib::PlayerController;

use crate::simulate::SimulatedEmbed;

pub struct StatusSnapshot {
    pub text: String,
}

pub struct StatusArgs<'a> {
    pub report: Option<&'a Report>,
    pub title: &'a str,
    pub visible: bool,
    pub favorite: bool,
    pub notice: Option<&'a str>,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let Some(report) = args.report else {
        return StatusSnapshot {
            text: "Nothing playing".to_string(),
        };
    };
    let state = if report.playing { "▶ Playing" } else { "⏸ Paused" };
    let total = report
        .duration
        .map(format_time)
        .unwrap_or_else(|| "--:--".to_string());
    let volume = if report.muted {
        "muted".to_string()
    } else {
        format!("{}%", report.volume)
    };
    let mut text = format!(
        "{}   {} / {}   ({:>5.1}%)\n{} [{}]{}\nVolume: {} | document: {}",
        state,
        format_time(report.time),
        total,
        report.percent(),
        args.title,
        report.media_id,
        if args.favorite { " ♥" } else { "" },
        volume,
        if args.visible { "visible" } else { "hidden" },
    );
    if let Some(notice) = args.notice {
        text.push('\n');
        text.push_str(notice);
    }
    StatusSnapshot { text }
}

/// Apply one pending key press. Returns `false` when the user quits.
pub fn handle_key_event<S: KeyValueStore>(
    player: &mut PlayerController<SimulatedEmbed, S>,
) -> bool {
    if event::poll(Duration::from_millis(50)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            match key.code {
                KeyCode::Char('q') => {
                    player.shutdown();
                    return false;
                }
                KeyCode::Char(' ') => player.toggle_play_pause(),
                KeyCode::Char('n') | KeyCode::Char('N') => player.play_next(),
                KeyCode::Char('p') | KeyCode::Char('P') => player.play_previous(),
                KeyCode::Left => player.seek_relative(-5.0),
                KeyCode::Right => player.seek_relative(5.0),
                KeyCode::Char('-') => {
                    let volume = player.volume().saturating_sub(10);
                    player.set_volume(volume);
                }
                KeyCode::Char('=') | KeyCode::Char('+') => {
                    let volume = player.volume().saturating_add(10).min(100);
                    player.set_volume(volume);
                }
                KeyCode::Char('m') | KeyCode::Char('M') => player.toggle_mute(),
                KeyCode::Char('f') | KeyCode::Char('F') => player.toggle_current_favorite(),
                KeyCode::Char('h') | KeyCode::Char('H') => {
                    let visible = player.is_visible();
                    player.set_visibility(!visible);
                }
                _ => {}
            }
        }
    }

    true
}
