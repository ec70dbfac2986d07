//! `session` subcommand: the controller driving a simulated embed.

use std::time::Duration;

use clap::ArgMatches;
use log::info;
use tabtune_lib::playback::timer::Clock;
use tabtune_lib::{EndSource, ManualClock, PlayerEvent};

use super::{open_player, parse_arg, parse_optional, print_notices, Player};
use crate::error::CliError;
use crate::simulate::{Inbox, SimulatedEmbed, EMBED_ORIGIN};

/// Simulated time per headless loop step.
const HEADLESS_STEP: Duration = Duration::from_millis(50);

pub struct Session {
    pub player: Player,
    inbox: Inbox,
}

impl Session {
    /// Load the library, hand known durations to the embed and start playing.
    ///
    /// Returns `None` when there is nothing to play.
    pub fn start<C: Clock + Clone + 'static>(
        args: &ArgMatches,
        clock: C,
    ) -> Result<Option<Self>, CliError> {
        let fallback = parse_arg::<f64>(args, "fallback-duration")?;
        let embed = SimulatedEmbed::new(Box::new(clock.clone()), fallback);
        let mut player = open_player(args, Box::new(clock), embed)?;

        let library = player.library();
        let durations: Vec<(String, f64)> = library
            .queue()
            .entries()
            .iter()
            .chain(library.favorites())
            .chain(library.playlists().iter().flat_map(|p| p.tracks.iter()))
            .filter(|entry| entry.duration > 0)
            .map(|entry| (entry.id.clone(), f64::from(entry.duration)))
            .collect();
        for (media_id, seconds) in durations {
            player.embed_mut().set_duration(&media_id, seconds);
        }

        match args.get_one::<String>("playlist") {
            Some(playlist_id) => player.play_playlist(playlist_id, 0),
            None if !player.library().queue().is_empty() => player.play_queue_index(0),
            None => println!("Queue is empty"),
        }
        if player.session().is_none() {
            print_notices(&mut player);
            return Ok(None);
        }

        let inbox = player.embed().inbox();
        Ok(Some(Self { player, inbox }))
    }

    /// One loop iteration: due timers, embed progress, embed replies.
    pub fn step(&mut self) -> Vec<PlayerEvent> {
        self.player.pump();
        self.player.embed_mut().tick();
        loop {
            let message = self.inbox.borrow_mut().pop_front();
            match message {
                Some(message) => self.player.handle_message(EMBED_ORIGIN, &message),
                None => break,
            }
        }
        self.player.drain_events()
    }
}

pub fn describe(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::NowPlaying {
            media_id, title, ..
        } => Some(format!("now playing {} ({})", media_id, title)),
        PlayerEvent::Ended { media_id, source } => {
            let source = match source {
                EndSource::Estimator => "estimator",
                EndSource::Background => "background",
                EndSource::Embed => "embed",
            };
            Some(format!("ended {} ({})", media_id, source))
        }
        PlayerEvent::Stopped => Some("stopped: nothing left to play".to_string()),
        PlayerEvent::Notice(notice) => Some(notice.message.clone()),
        PlayerEvent::PlayState { .. }
        | PlayerEvent::QueueChanged
        | PlayerEvent::FavoritesChanged
        | PlayerEvent::PlaylistsChanged => None,
    }
}

/// Run a session on simulated time and print its events.
pub fn run_headless(args: &ArgMatches) -> Result<i32, CliError> {
    let seconds = parse_arg::<f64>(args, "seconds")?;
    let limit = Duration::try_from_secs_f64(seconds.max(0.0)).map_err(|_| {
        CliError::InvalidArgument {
            name: "seconds",
            value: seconds.to_string(),
        }
    })?;
    let hide_at = parse_optional::<f64>(args, "hide-at")?;
    let show_at = parse_optional::<f64>(args, "show-at")?;

    let clock = ManualClock::new();
    let Some(mut session) = Session::start(args, clock.clone())? else {
        return Ok(1);
    };

    let mut hidden = false;
    let mut shown = false;
    let mut stopped = false;
    let mut events = session.player.drain_events();
    loop {
        let at = clock.now().as_secs_f64();
        for event in &events {
            if let Some(line) = describe(event) {
                println!("[{:>7.2}] {}", at, line);
            }
            stopped |= *event == PlayerEvent::Stopped;
        }
        if stopped || clock.now() >= limit {
            break;
        }

        clock.advance(HEADLESS_STEP);
        let at = clock.now().as_secs_f64();
        if !hidden && hide_at.is_some_and(|hide| at >= hide) {
            hidden = true;
            session.player.set_visibility(false);
            println!("[{:>7.2}] document hidden", at);
        }
        if hidden && !shown && show_at.is_some_and(|show| at >= show) {
            shown = true;
            session.player.set_visibility(true);
            println!("[{:>7.2}] document visible", at);
        }
        events = session.step();
    }

    session.player.shutdown();
    info!("headless session finished at {:.2}s", clock.now().as_secs_f64());
    Ok(0)
}
