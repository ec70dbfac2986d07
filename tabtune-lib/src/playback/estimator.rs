//! Client-side interpolation of the remote playback position.
//!
//! The embed only answers position queries asynchronously and sporadically.
//! Between authoritative samples the position is extrapolated from elapsed
//! wall-clock time, and the end of media is detected ahead of the embed's own
//! `ended` event.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PositionEstimator {
    anchor_position: f64,
    anchor_at: Duration,
    floor: f64,
    duration: Option<f64>,
    end_margin: f64,
    running: bool,
}

impl PositionEstimator {
    pub fn new(end_margin: f64) -> Self {
        Self {
            anchor_position: 0.0,
            anchor_at: Duration::ZERO,
            floor: 0.0,
            duration: None,
            end_margin: end_margin.max(0.0),
            running: false,
        }
    }

    /// Forget everything about the previous media.
    pub fn reset(&mut self, now: Duration) {
        self.anchor_position = 0.0;
        self.anchor_at = now;
        self.floor = 0.0;
        self.duration = None;
        self.running = false;
    }

    pub fn set_end_margin(&mut self, end_margin: f64) {
        self.end_margin = end_margin.max(0.0);
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| *d > 0.0);
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resume extrapolation from the current estimate.
    pub fn start(&mut self, now: Duration) {
        if self.running {
            return;
        }
        self.anchor_position = self.anchor_position.max(self.floor);
        self.anchor_at = now;
        self.running = true;
    }

    /// Freeze the estimate at its current value.
    pub fn pause(&mut self, now: Duration) {
        if !self.running {
            return;
        }
        self.anchor_position = self.clamp(self.extrapolate(now).max(self.floor));
        self.anchor_at = now;
        self.running = false;
    }

    /// Record an authoritative position sample.
    pub fn sample(&mut self, position: f64, at: Duration) {
        self.anchor_position = position.max(0.0);
        self.anchor_at = at;
    }

    /// Jump to a new position; unlike a sample this may move backwards.
    pub fn seek(&mut self, position: f64, at: Duration) {
        let position = self.clamp(position.max(0.0));
        self.anchor_position = position;
        self.anchor_at = at;
        self.floor = position;
    }

    /// Raw extrapolation `P + (now - T)`, without clamping.
    pub fn extrapolate(&self, now: Duration) -> f64 {
        if self.running {
            self.anchor_position + now.saturating_sub(self.anchor_at).as_secs_f64()
        } else {
            self.anchor_position
        }
    }

    /// Estimated position without recording it as reported.
    pub fn peek(&self, now: Duration) -> f64 {
        self.clamp(self.extrapolate(now).max(self.floor))
    }

    /// Estimated position for display.
    ///
    /// Reported values never decrease until the next seek or reset, and never
    /// exceed the known duration.
    pub fn report(&mut self, now: Duration) -> f64 {
        let position = self.peek(now);
        self.floor = position;
        position
    }

    /// Last value handed out by [`report`](Self::report).
    pub fn reported(&self) -> f64 {
        self.floor
    }

    /// Margin actually applied for a given duration.
    ///
    /// Capped at half the duration so short clips are not ended on load.
    pub fn effective_margin(&self, duration: f64) -> f64 {
        self.end_margin.min(duration * 0.5)
    }

    /// Whether the extrapolated position is within the end margin.
    ///
    /// Always false while the duration is unknown.
    pub fn reached_end(&self, now: Duration) -> bool {
        match self.duration {
            Some(duration) => {
                self.extrapolate(now) >= duration - self.effective_margin(duration)
            }
            None => false,
        }
    }

    fn clamp(&self, position: f64) -> f64 {
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}
