//! High-level playback controller for the remote embed.
//!
//! The embed cannot be queried synchronously: every command is posted and its
//! effect is observed later through an inbound message. [`PlayerController`]
//! owns the one active [`PlaybackSession`], the library feeding "what plays
//! next", and the timers that drive position estimation. It is single-threaded
//! and is advanced by the host calling [`PlayerController::pump`].

mod collections;
mod controls;
mod events;
mod settings;
#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::time::Duration;

use log::debug;

use crate::diagnostics::reporter::{Report, Reporter};
use crate::library::{KeyValueStore, Library, MediaInfo};
use crate::protocol::{Command, Inbound};
use crate::settings::PlayerSettings;

use super::background::BackgroundTracker;
use super::session::PlaybackSession;
use super::timer::{Clock, OneShot, PeriodicTask};

pub use collections::PlaylistSource;
pub use events::MetadataTicket;

/// Host side of the embedded player document.
pub trait EmbedPort {
    /// Whether the embed currently has a content window to post to.
    fn has_content_window(&self) -> bool;
    /// Point the embed at a new source URL.
    fn load(&mut self, url: &str);
    /// Post a serialized message to the content window.
    fn post(&mut self, message: &str);
}

/// What detected the end of the current media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSource {
    /// Foreground estimate crossed the end margin.
    Estimator,
    /// Background tracker extrapolation crossed the end margin.
    Background,
    /// The embed reported state code 0.
    Embed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Short, non-blocking user message (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// Outbound notification for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    NowPlaying {
        media_id: String,
        title: String,
        thumbnail: String,
        queue_index: Option<usize>,
    },
    PlayState {
        playing: bool,
    },
    Ended {
        media_id: String,
        source: EndSource,
    },
    /// End of media with nothing left to advance to.
    Stopped,
    Notice(Notice),
    QueueChanged,
    FavoritesChanged,
    PlaylistsChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Settle,
    Advance,
    Foreground,
    Background,
}

/// Primary playback controller.
///
/// Owns the embed port, the library store, the clock and every timer. All
/// state is touched only through `&mut self`, so no locking is involved.
pub struct PlayerController<E: EmbedPort, S: KeyValueStore> {
    settings: PlayerSettings,
    inbound: Inbound,
    clock: Box<dyn Clock>,
    embed: E,
    library: Library<S>,
    session: Option<PlaybackSession>,
    generation: u64,
    media_cache: HashMap<String, MediaInfo>,
    search_results: Vec<MediaInfo>,
    active_playlist: Option<String>,
    visible: bool,
    volume: u8,
    muted: bool,
    foreground: PeriodicTask,
    background: BackgroundTracker,
    settle: OneShot,
    advance: OneShot,
    events: Vec<PlayerEvent>,
    reporter: Reporter,
}

impl<E: EmbedPort, S: KeyValueStore> PlayerController<E, S> {
    /// Create a controller over an already loaded library.
    pub fn new(
        settings: PlayerSettings,
        clock: Box<dyn Clock>,
        embed: E,
        library: Library<S>,
    ) -> Self {
        let inbound = Inbound::new(settings.trusted_origins.clone());
        let foreground = PeriodicTask::new(settings.foreground_tick());
        let background = BackgroundTracker::new(settings.background_tick());
        let mut media_cache = HashMap::new();
        for entry in library
            .queue()
            .entries()
            .iter()
            .chain(library.favorites())
            .chain(library.playlists().iter().flat_map(|p| p.tracks.iter()))
        {
            media_cache.insert(entry.id.clone(), entry.info());
        }

        Self {
            settings,
            inbound,
            clock,
            embed,
            library,
            session: None,
            generation: 0,
            media_cache,
            search_results: Vec::new(),
            active_playlist: None,
            visible: true,
            volume: 100,
            muted: false,
            foreground,
            background,
            settle: OneShot::default(),
            advance: OneShot::default(),
            events: Vec::new(),
            reporter: Reporter::new(),
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn embed(&self) -> &E {
        &self.embed
    }

    pub fn embed_mut(&mut self) -> &mut E {
        &mut self.embed
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn search_results(&self) -> &[MediaInfo] {
        &self.search_results
    }

    pub fn active_playlist(&self) -> Option<&str> {
        self.active_playlist.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing)
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Known metadata for `media_id`, from lookups or library entries.
    pub fn media_info(&self, media_id: &str) -> Option<&MediaInfo> {
        self.media_cache.get(media_id)
    }

    /// Remember metadata so the id can later be queued or favorited.
    pub fn remember(&mut self, info: MediaInfo) {
        self.media_cache.insert(info.id.clone(), info);
    }

    /// Whether the foreground estimator or the background tracker is ticking.
    pub fn timers_running(&self) -> (bool, bool) {
        (self.foreground.is_running(), self.background.is_engaged())
    }

    /// Take all events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enable change-only status reporting on every estimator tick and sync.
    pub fn set_reporting(&mut self, report: impl FnMut(Report) + 'static) {
        self.reporter.set(Box::new(report));
    }

    pub fn clear_reporting(&mut self) {
        self.reporter.clear();
    }

    /// Current status, estimated at the clock's present time.
    pub fn snapshot(&self) -> Option<Report> {
        let now = self.clock.now();
        self.session.as_ref().map(|session| Report {
            media_id: session.media_id.clone(),
            time: session.estimator.peek(now),
            duration: session.duration(),
            playing: session.is_playing,
            volume: self.volume,
            muted: self.muted,
        })
    }

    /// Fire every timer that is due, earliest first.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        while let Some(kind) = self.next_due_timer(now) {
            match kind {
                TimerKind::Settle => {
                    if let Some(generation) = self.settle.take_due(now) {
                        self.on_settled(generation, now);
                    }
                }
                TimerKind::Advance => {
                    if let Some(generation) = self.advance.take_due(now) {
                        self.on_advance_due(generation);
                    }
                }
                TimerKind::Foreground => {
                    if self.foreground.take_due(now) {
                        self.on_foreground_tick(now);
                    }
                }
                TimerKind::Background => {
                    if self.background.take_due(now) {
                        self.on_background_tick(now);
                    }
                }
            }
        }
    }

    /// Earliest instant any timer wants to run, for hosts that sleep.
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.settle.next_due(),
            self.advance.next_due(),
            self.foreground.next_due(),
            self.background.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every timer, as on page unload.
    pub fn shutdown(&mut self) {
        self.stop_timers();
        debug!("player shut down");
    }

    fn next_due_timer(&self, now: Duration) -> Option<TimerKind> {
        [
            (self.settle.next_due(), TimerKind::Settle),
            (self.advance.next_due(), TimerKind::Advance),
            (self.foreground.next_due(), TimerKind::Foreground),
            (self.background.next_due(), TimerKind::Background),
        ]
        .into_iter()
        .filter_map(|(due, kind)| due.filter(|due| *due <= now).map(|due| (due, kind)))
        .min_by_key(|(due, _)| *due)
        .map(|(_, kind)| kind)
    }

    fn stop_timers(&mut self) {
        self.foreground.stop();
        self.background.disengage();
        self.settle.cancel();
        self.advance.cancel();
    }

    /// Post a command, or drop it when the embed has no content window.
    fn post(&mut self, command: Command) -> bool {
        if !self.embed.has_content_window() {
            debug!("dropping {}: embed has no content window", command.func());
            return false;
        }
        self.embed.post(&command.to_message());
        true
    }

    /// Ask the embed for duration and current time.
    fn request_sync(&mut self) {
        self.post(Command::GetDuration);
        self.post(Command::GetCurrentTime);
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.events.push(event);
    }

    fn notify(&mut self, notice: Notice) {
        self.emit(PlayerEvent::Notice(notice));
    }

    fn publish_report(&mut self) {
        if !self.reporter.is_active() {
            return;
        }
        if let Some(report) = self.snapshot() {
            self.reporter.publish(report);
        }
    }
}
