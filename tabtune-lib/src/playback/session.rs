//! The record of what is currently loaded in the embed.

use std::time::Duration;

use super::estimator::PositionEstimator;

/// One media item's playback, from load until the next load replaces it.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub media_id: String,
    pub title: String,
    pub thumbnail: String,
    pub is_playing: bool,
    /// Load counter; results tagged with an older generation are stale.
    pub generation: u64,
    pub(crate) estimator: PositionEstimator,
    pub(crate) end_handled: bool,
    pub(crate) seen_activity: bool,
}

impl PlaybackSession {
    pub(crate) fn new(
        media_id: &str,
        title: &str,
        thumbnail: &str,
        generation: u64,
        duration: Option<f64>,
        end_margin: f64,
        now: Duration,
    ) -> Self {
        let mut estimator = PositionEstimator::new(end_margin);
        estimator.reset(now);
        estimator.set_duration(duration);
        Self {
            media_id: media_id.to_string(),
            title: title.to_string(),
            thumbnail: thumbnail.to_string(),
            is_playing: false,
            generation,
            estimator,
            end_handled: false,
            seen_activity: false,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.estimator.duration()
    }

    /// Last position handed to the UI.
    pub fn position(&self) -> f64 {
        self.estimator.reported()
    }

    /// Whether end-of-media has already been handled for this load.
    pub fn has_ended(&self) -> bool {
        self.end_handled
    }

    pub fn estimator(&self) -> &PositionEstimator {
        &self.estimator
    }
}
