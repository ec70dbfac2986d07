use std::io;

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use tabtune_lib::{PlayerEvent, PlayerSettings, SystemClock};

use crate::cli::session::{self, Session};
use crate::error::CliError;
use crate::logging::{self, LogBuffer};
use crate::{cli, controls, ui};

pub fn run(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, CliError> {
    info!("Starting tabtune");
    match args.subcommand() {
        Some(("create", sub)) => match sub.subcommand() {
            Some(("settings-json", _)) => {
                let json = serde_json::to_string_pretty(&PlayerSettings::default())?;
                println!("{}", json);
                Ok(0)
            }
            _ => Ok(-1),
        },
        Some(("queue", sub)) => cli::library::run_queue(sub),
        Some(("favorites", sub)) => cli::library::run_favorites(sub),
        Some(("playlist", sub)) => cli::library::run_playlist(sub),
        Some(("lookup", sub)) => cli::catalog::run_lookup(sub),
        Some(("search", sub)) => cli::catalog::run_search(sub),
        Some(("session", sub)) => {
            if sub.get_flag("headless") {
                session::run_headless(sub)
            } else {
                run_interactive(sub, log_buffer)
            }
        }
        _ => Ok(-1),
    }
}

/// Interactive session on the wall clock, rendered with ratatui.
fn run_interactive(args: &ArgMatches, log_buffer: LogBuffer) -> Result<i32, CliError> {
    let Some(mut session) = Session::start(args, SystemClock::new())? else {
        return Ok(1);
    };

    let _raw_mode = RawModeGuard::enable().ok();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).ok();

    let mut notice: Option<String> = None;
    loop {
        for event in session.step() {
            if let PlayerEvent::Notice(message) = &event {
                notice = Some(message.message.clone());
            }
            if let Some(line) = session::describe(&event) {
                info!("{}", line);
            }
        }

        if let Some(term) = terminal.as_mut() {
            let player = &session.player;
            let report = player.snapshot();
            let title = player.session().map(|s| s.title.as_str()).unwrap_or_default();
            let favorite = report
                .as_ref()
                .is_some_and(|report| player.is_favorite(&report.media_id));
            let status = controls::status_text(controls::StatusArgs {
                report: report.as_ref(),
                title,
                visible: player.is_visible(),
                favorite,
                notice: notice.as_deref(),
            });
            let queue = player.library().queue();
            let queue_lines: Vec<String> = queue
                .entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let marker = if Some(index) == queue.current() { "▶" } else { " " };
                    format!("{} {}", marker, entry.title)
                })
                .collect();
            let log_lines = logging::snapshot(&log_buffer);
            ui::draw_status(term, &status, &queue_lines, &log_lines);
        }

        if !controls::handle_key_event(&mut session.player) {
            break;
        }
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }

    Ok(0)
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
