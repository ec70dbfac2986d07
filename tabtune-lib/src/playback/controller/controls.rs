//! Transport operations for `PlayerController`.
//!
//! Methods here post remote-control commands and move the session between
//! playing and paused. None of them wait: the embed confirms through a later
//! state or info message.

use log::{debug, info};

use crate::library::KeyValueStore;
use crate::protocol::{embed_url, Command};

use super::super::session::PlaybackSession;
use super::{EmbedPort, PlayerController, PlayerEvent};

impl<E: EmbedPort, S: KeyValueStore> PlayerController<E, S> {
    /// Play `media_id`.
    ///
    /// When the same media is already loaded this toggles between pause and
    /// resume in place. Otherwise timers are torn down, the session is
    /// replaced, the embed is pointed at the new media and the first state
    /// requests are deferred by the settle delay.
    ///
    /// # Arguments
    ///
    /// * `queue_index` - Position in the queue when playing from it.
    pub fn play(&mut self, media_id: &str, title: &str, thumbnail: &str, queue_index: Option<usize>) {
        if let Some(session) = self.session.as_ref() {
            if session.media_id == media_id && !session.end_handled {
                if session.is_playing {
                    self.pause();
                } else {
                    self.resume();
                }
                return;
            }
        }
        self.load(media_id, title, thumbnail, queue_index);
    }

    /// Load media unconditionally, replacing any current session.
    pub(super) fn load(&mut self, media_id: &str, title: &str, thumbnail: &str, queue_index: Option<usize>) {
        let now = self.clock.now();
        self.stop_timers();

        let cached = self.media_cache.get(media_id);
        let duration = cached
            .map(|info| info.duration)
            .filter(|duration| *duration > 0)
            .map(f64::from);
        let title = if title.is_empty() {
            cached.map(|info| info.title.clone()).unwrap_or_default()
        } else {
            title.to_string()
        };
        let thumbnail = if thumbnail.is_empty() {
            cached.map(|info| info.thumbnail.clone()).unwrap_or_default()
        } else {
            thumbnail.to_string()
        };

        self.generation += 1;
        let mut session = PlaybackSession::new(
            media_id,
            &title,
            &thumbnail,
            self.generation,
            duration,
            self.settings.end_margin_secs,
            now,
        );
        session.is_playing = true;
        session.estimator.start(now);
        self.session = Some(session);
        self.library.set_queue_current(queue_index);

        info!("loading {} ({})", media_id, title);
        let url = embed_url(&self.settings.embed_host, media_id, &self.settings.page_origin);
        self.embed.load(&url);
        self.settle
            .arm(now, self.settings.settle_delay(), self.generation);

        self.emit(PlayerEvent::NowPlaying {
            media_id: media_id.to_string(),
            title,
            thumbnail,
            queue_index: self.library.queue().current(),
        });
        self.emit(PlayerEvent::PlayState { playing: true });
        self.publish_report();
    }

    /// Resume the current media. Media that already ended is reloaded.
    pub fn resume(&mut self) {
        let now = self.clock.now();
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.end_handled {
            let (media_id, title, thumbnail) = (
                session.media_id.clone(),
                session.title.clone(),
                session.thumbnail.clone(),
            );
            let queue_index = self.library.queue().current();
            self.load(&media_id, &title, &thumbnail, queue_index);
            return;
        }
        if session.is_playing {
            return;
        }

        self.post(Command::PlayVideo);
        if let Some(session) = self.session.as_mut() {
            session.is_playing = true;
            session.estimator.start(now);
        }
        self.start_tracking(now);
        self.emit(PlayerEvent::PlayState { playing: true });
        self.publish_report();
    }

    /// Pause the current media and stop both estimator timers.
    pub fn pause(&mut self) {
        let now = self.clock.now();
        if !self.is_playing() {
            return;
        }
        self.post(Command::PauseVideo);
        self.foreground.stop();
        self.background.disengage();
        if let Some(session) = self.session.as_mut() {
            session.is_playing = false;
            session.estimator.pause(now);
        }
        self.emit(PlayerEvent::PlayState { playing: false });
        self.publish_report();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Seek to a fraction (0.0 to 1.0) of the media duration.
    ///
    /// Falls back to the configured seek duration while the real one is not
    /// known yet.
    pub fn seek(&mut self, fraction: f64) {
        let duration = self
            .session
            .as_ref()
            .and_then(|s| s.duration())
            .unwrap_or(self.settings.seek_fallback_secs);
        self.seek_to(fraction.clamp(0.0, 1.0) * duration);
    }

    /// Seek `delta` seconds from the current estimate.
    pub fn seek_relative(&mut self, delta: f64) {
        let now = self.clock.now();
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let target = session.estimator.peek(now) + delta;
        let target = match session.duration() {
            Some(duration) => target.clamp(0.0, duration),
            None => target.max(0.0),
        };
        self.seek_to(target);
    }

    /// Seek to an absolute position in seconds.
    pub fn seek_to(&mut self, seconds: f64) {
        let now = self.clock.now();
        if self.session.is_none() {
            return;
        }
        let posted = self.post(Command::SeekTo {
            seconds,
            allow_seek_ahead: true,
        });
        if !posted {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.estimator.seek(seconds, now);
        }
        self.publish_report();
    }

    /// Set the volume (0 to 100).
    pub fn set_volume(&mut self, volume: u8) {
        let volume = volume.min(100);
        self.post(Command::SetVolume(volume));
        self.volume = volume;
        self.publish_report();
    }

    pub fn mute(&mut self) {
        if self.post(Command::Mute) {
            self.muted = true;
            self.publish_report();
        }
    }

    /// Unmute and restore full volume.
    pub fn unmute(&mut self) {
        if self.post(Command::UnMute) {
            self.muted = false;
            self.volume = 100;
            self.publish_report();
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Document visibility changed.
    ///
    /// Hidden documents get the coarse background tracker instead of the
    /// foreground estimator. Becoming visible tears the tracker down and
    /// resyncs at once.
    pub fn set_visibility(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        let now = self.clock.now();
        self.visible = visible;
        debug!("document {}", if visible { "visible" } else { "hidden" });

        if visible {
            self.background.disengage();
            self.request_sync();
            if self.is_playing() {
                self.foreground.start(now);
            }
        } else {
            self.foreground.stop();
            if self.is_playing() {
                self.engage_background(now);
            }
        }
    }

    /// Start whichever tracker matches the current visibility.
    pub(super) fn start_tracking(&mut self, now: std::time::Duration) {
        if self.visible {
            self.foreground.start(now);
        } else {
            self.foreground.stop();
            self.engage_background(now);
        }
    }

    /// Snapshot position and expected end for the background tracker.
    ///
    /// Nothing is engaged while the duration is unknown.
    pub(super) fn engage_background(&mut self, now: std::time::Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(duration) = session.duration() else {
            debug!("background tracking skipped: duration unknown");
            return;
        };
        let position = session.estimator.peek(now);
        self.background.engage(now, position, duration);
    }
}
