use std::time::Duration;

use crate::library::KeyValueStore;
use crate::protocol::Inbound;

use super::{EmbedPort, PlayerController};

impl<E: EmbedPort, S: KeyValueStore> PlayerController<E, S> {
    /// Configure the end-of-media margin (seconds) for this and later loads.
    pub fn set_end_margin_secs(&mut self, secs: f64) {
        let secs = secs.max(0.0);
        self.settings.end_margin_secs = secs;
        if let Some(session) = self.session.as_mut() {
            session.estimator.set_end_margin(secs);
        }
    }

    /// Configure the foreground estimator cadence (ms).
    ///
    /// A running tick keeps its current deadline and uses the new interval
    /// from the next firing on.
    pub fn set_foreground_tick_ms(&mut self, ms: u64) {
        self.settings.foreground_tick_ms = ms;
        self.foreground.set_interval(self.settings.foreground_tick());
    }

    /// Configure the background tracker cadence (ms).
    pub fn set_background_tick_ms(&mut self, ms: u64) {
        self.settings.background_tick_ms = ms;
        self.background.set_interval(self.settings.background_tick());
    }

    /// Configure the delay between a load and the first state requests (ms).
    pub fn set_settle_delay_ms(&mut self, ms: u64) {
        self.settings.settle_delay_ms = ms;
    }

    /// Configure the grace delay between end-of-media and advancing (ms).
    pub fn set_advance_grace_ms(&mut self, ms: u64) {
        self.settings.advance_grace_ms = ms;
    }

    /// Configure the duration assumed by `seek` while the real one is unknown.
    pub fn set_seek_fallback_secs(&mut self, secs: f64) {
        self.settings.seek_fallback_secs = secs.max(0.0);
    }

    /// Replace the origins inbound messages are accepted from.
    pub fn set_trusted_origins(&mut self, origins: Vec<String>) {
        self.inbound = Inbound::new(origins.clone());
        self.settings.trusted_origins = origins;
    }

    /// Debug helper returning generation, settle-armed and advance-armed flags.
    pub fn debug_timer_state(&self) -> (u64, bool, bool) {
        (
            self.generation,
            self.settle.is_armed(),
            self.advance.is_armed(),
        )
    }

    /// Time left until the pending advance fires, if one is armed.
    pub fn advance_pending_in(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.advance.next_due().map(|due| due.saturating_sub(now))
    }
}
