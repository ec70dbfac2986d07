//! Inbound embed messages, timer callbacks and end-of-media handling.

use std::time::Duration;

use log::{debug, info, warn};

use crate::catalog::CatalogError;
use crate::library::{KeyValueStore, MediaInfo};
use crate::protocol::{EmbedEvent, PlayerStateCode, ProtocolError};

use super::{EmbedPort, EndSource, Notice, PlayerController, PlayerEvent};

/// Handle for an in-flight metadata lookup.
///
/// Results are matched against the session that was current when the lookup
/// started, so a slow response for skipped media cannot overwrite the title of
/// whatever plays now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTicket {
    pub media_id: String,
    pub generation: u64,
}

/// Where the next item comes from.
enum NextItem {
    Queue(usize),
    Playlist(MediaInfo),
    SearchResult(MediaInfo),
}

impl<E: EmbedPort, S: KeyValueStore> PlayerController<E, S> {
    /// Process one raw message received from the embed.
    ///
    /// Messages that fail validation are logged and discarded.
    pub fn handle_message(&mut self, origin: &str, data: &str) {
        let event = match self.inbound.parse(origin, data) {
            Ok(event) => event,
            Err(ProtocolError::UntrustedOrigin(origin)) => {
                debug!("discarding message from untrusted origin {}", origin);
                return;
            }
            Err(err) => {
                warn!("discarding embed message: {}", err);
                return;
            }
        };
        self.handle_event(event);
    }

    /// Process an already parsed embed event.
    pub fn handle_event(&mut self, event: EmbedEvent) {
        let now = self.clock.now();
        match event {
            EmbedEvent::Ready => {
                debug!("embed ready");
                self.request_sync();
            }
            EmbedEvent::InfoDelivery {
                current_time,
                duration,
            } => self.on_info(now, current_time, duration),
            EmbedEvent::StateChange(state) => self.on_state_change(now, state),
        }
    }

    fn on_info(&mut self, now: Duration, current_time: Option<f64>, duration: Option<f64>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let whole_secs = duration
            .filter(|d| d.is_finite())
            .map(f64::floor)
            .filter(|d| *d > 0.0);
        let mut learned_duration = None;
        if let Some(secs) = whole_secs {
            if session.duration() != Some(secs) {
                session.estimator.set_duration(Some(secs));
                learned_duration = Some((session.media_id.clone(), secs));
            }
        }
        if let Some(position) = current_time.filter(|t| t.is_finite()) {
            session.estimator.sample(position, now);
        }

        if let Some((media_id, secs)) = learned_duration {
            debug!("duration of {} is {}s", media_id, secs);
            if let Some(info) = self.media_cache.get_mut(&media_id) {
                info.duration = secs as u32;
            }
            if !self.visible && self.is_playing() && !self.background.is_engaged() {
                self.engage_background(now);
            }
        }
        self.publish_report();
    }

    fn on_state_change(&mut self, now: Duration, state: PlayerStateCode) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        debug!("embed state {:?} for {}", state, session.media_id);

        match state {
            PlayerStateCode::Unstarted | PlayerStateCode::Cued => {
                let was_playing = session.is_playing;
                session.is_playing = false;
                session.estimator.pause(now);
                self.foreground.stop();
                self.background.disengage();
                if was_playing {
                    self.emit(PlayerEvent::PlayState { playing: false });
                    self.publish_report();
                }
            }
            PlayerStateCode::Ended => {
                if !session.seen_activity {
                    debug!("ignoring ended state before playback started");
                    return;
                }
                self.handle_end(EndSource::Embed);
            }
            PlayerStateCode::Playing => {
                if session.end_handled {
                    return;
                }
                session.seen_activity = true;
                let was_playing = session.is_playing;
                session.is_playing = true;
                session.estimator.start(now);
                self.start_tracking(now);
                self.request_sync();
                if !was_playing {
                    self.emit(PlayerEvent::PlayState { playing: true });
                }
            }
            PlayerStateCode::Paused => {
                if !session.is_playing {
                    return;
                }
                session.is_playing = false;
                session.estimator.pause(now);
                self.foreground.stop();
                self.background.disengage();
                self.emit(PlayerEvent::PlayState { playing: false });
                self.publish_report();
            }
            PlayerStateCode::Buffering => {
                session.seen_activity = true;
            }
        }
    }

    /// Settle delay after a load elapsed: start tracking and ask for state.
    pub(super) fn on_settled(&mut self, generation: u64, now: Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.generation != generation {
            return;
        }
        if session.is_playing {
            self.start_tracking(now);
        }
        self.request_sync();
    }

    pub(super) fn on_foreground_tick(&mut self, now: Duration) {
        let Some(session) = self.session.as_mut() else {
            self.foreground.stop();
            return;
        };
        if !session.is_playing {
            return;
        }
        if session.estimator.reached_end(now) {
            self.handle_end(EndSource::Estimator);
            return;
        }
        session.estimator.report(now);
        self.publish_report();
        self.request_sync();
    }

    pub(super) fn on_background_tick(&mut self, now: Duration) {
        let ended = match self.session.as_ref() {
            Some(session) if session.is_playing => {
                self.background.reached_end(&session.estimator, now)
            }
            _ => {
                self.background.disengage();
                return;
            }
        };
        if ended {
            self.handle_end(EndSource::Background);
        }
    }

    /// Common end-of-media path. Runs at most once per load.
    fn handle_end(&mut self, source: EndSource) {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.end_handled {
            debug!("end of {} already handled", session.media_id);
            return;
        }
        session.end_handled = true;
        session.is_playing = false;
        session.estimator.pause(now);
        if let Some(duration) = session.duration() {
            session.estimator.seek(duration, now);
        }
        let media_id = session.media_id.clone();
        let generation = session.generation;

        self.foreground.stop();
        self.background.disengage();
        self.settle.cancel();
        info!("{} ended ({:?})", media_id, source);

        self.emit(PlayerEvent::Ended { media_id, source });
        self.emit(PlayerEvent::PlayState { playing: false });
        self.publish_report();
        self.advance
            .arm(now, self.settings.advance_grace(), generation);
    }

    /// Grace delay after end-of-media elapsed: move on to the next item.
    pub(super) fn on_advance_due(&mut self, generation: u64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.generation != generation {
            return;
        }
        match self.next_after_end() {
            Some(next) => self.play_item(next),
            None => {
                info!("nothing left to play");
                self.emit(PlayerEvent::Stopped);
            }
        }
    }

    /// Skip to the next item on user request.
    ///
    /// Unlike the automatic advance, a queue with no current entry starts from
    /// its first entry.
    pub fn play_next(&mut self) {
        let next = self
            .library
            .queue()
            .next_index()
            .map(NextItem::Queue)
            .or_else(|| self.next_in_playlist())
            .or_else(|| self.search_neighbour(1).map(NextItem::SearchResult));
        match next {
            Some(next) => self.play_item(next),
            None => self.notify(Notice::info("Nothing to play next")),
        }
    }

    pub fn play_previous(&mut self) {
        let previous = self
            .library
            .queue()
            .previous_index()
            .map(NextItem::Queue)
            .or_else(|| self.search_neighbour(-1).map(NextItem::SearchResult));
        match previous {
            Some(previous) => self.play_item(previous),
            None => self.notify(Notice::info("Nothing to play before this")),
        }
    }

    /// Priority: queue position, active playlist, search results.
    fn next_after_end(&self) -> Option<NextItem> {
        let queue = self.library.queue();
        let from_queue = queue
            .current()
            .map(|current| current + 1)
            .filter(|next| *next < queue.len())
            .map(NextItem::Queue);
        from_queue
            .or_else(|| self.next_in_playlist())
            .or_else(|| self.search_neighbour(1).map(NextItem::SearchResult))
    }

    fn next_in_playlist(&self) -> Option<NextItem> {
        let playlist = self.library.playlist(self.active_playlist.as_deref()?)?;
        let media_id = &self.session.as_ref()?.media_id;
        let next = playlist.position(media_id)? + 1;
        playlist
            .tracks
            .get(next)
            .map(|track| NextItem::Playlist(track.info()))
    }

    fn search_neighbour(&self, step: isize) -> Option<MediaInfo> {
        let media_id = &self.session.as_ref()?.media_id;
        let index = self.search_results.iter().position(|r| &r.id == media_id)?;
        let neighbour = index.checked_add_signed(step)?;
        self.search_results.get(neighbour).cloned()
    }

    fn play_item(&mut self, item: NextItem) {
        match item {
            NextItem::Queue(index) => {
                let Some(entry) = self.library.queue().get(index).cloned() else {
                    return;
                };
                self.load(&entry.id, &entry.title, &entry.thumbnail, Some(index));
                self.emit(PlayerEvent::QueueChanged);
            }
            NextItem::Playlist(info) | NextItem::SearchResult(info) => {
                self.load(&info.id, &info.title, &info.thumbnail, None);
            }
        }
    }

    /// Start tracking a metadata lookup for `media_id`.
    pub fn request_metadata(&self, media_id: &str) -> MetadataTicket {
        MetadataTicket {
            media_id: media_id.to_string(),
            generation: self.generation,
        }
    }

    /// Deliver the outcome of a metadata lookup.
    ///
    /// Successful results are always cached. They update the session only
    /// when it is still the one the ticket was issued for. Returns whether
    /// the session was updated.
    pub fn apply_metadata(
        &mut self,
        ticket: &MetadataTicket,
        result: Result<MediaInfo, CatalogError>,
    ) -> bool {
        let info = match result {
            Ok(info) => info,
            Err(err) => {
                warn!("metadata lookup for {} failed: {}", ticket.media_id, err);
                self.notify(Notice::error("Error fetching video information"));
                return false;
            }
        };
        self.remember(info.clone());

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.generation != ticket.generation || session.media_id != ticket.media_id {
            debug!("dropping stale metadata for {}", ticket.media_id);
            return false;
        }
        if !info.title.is_empty() {
            session.title = info.title.clone();
        }
        if !info.thumbnail.is_empty() {
            session.thumbnail = info.thumbnail.clone();
        }
        if session.duration().is_none() && info.duration > 0 {
            session.estimator.set_duration(Some(f64::from(info.duration)));
        }
        let (media_id, title, thumbnail) = (
            session.media_id.clone(),
            session.title.clone(),
            session.thumbnail.clone(),
        );
        self.emit(PlayerEvent::NowPlaying {
            media_id,
            title,
            thumbnail,
            queue_index: self.library.queue().current(),
        });
        true
    }
}
