//! Coarse end-of-media tracking while the document is hidden.
//!
//! Hosts throttle timers in hidden documents, so the foreground estimator tick
//! is switched off and this tracker takes over on a slower cadence.

use std::time::Duration;

use super::estimator::PositionEstimator;
use super::timer::PeriodicTask;

/// Position and expected end captured when the document was hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundSnapshot {
    pub video_start_time: f64,
    pub expected_end_time: f64,
}

#[derive(Debug, Clone)]
pub struct BackgroundTracker {
    task: PeriodicTask,
    snapshot: Option<BackgroundSnapshot>,
}

impl BackgroundTracker {
    pub fn new(interval: Duration) -> Self {
        Self {
            task: PeriodicTask::new(interval),
            snapshot: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.task.set_interval(interval);
    }

    /// Snapshot the current position and start ticking.
    pub fn engage(&mut self, now: Duration, start_position: f64, expected_end: f64) {
        self.snapshot = Some(BackgroundSnapshot {
            video_start_time: start_position,
            expected_end_time: expected_end,
        });
        self.task.start(now);
    }

    pub fn disengage(&mut self) {
        self.task.stop();
        self.snapshot = None;
    }

    pub fn is_engaged(&self) -> bool {
        self.task.is_running()
    }

    pub fn snapshot(&self) -> Option<BackgroundSnapshot> {
        self.snapshot
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.task.next_due()
    }

    pub fn take_due(&mut self, now: Duration) -> bool {
        self.task.take_due(now)
    }

    /// Whether the extrapolated position has reached the expected end.
    pub fn reached_end(&self, estimator: &PositionEstimator, now: Duration) -> bool {
        match self.snapshot {
            Some(snapshot) => {
                let margin = estimator.effective_margin(snapshot.expected_end_time);
                estimator.extrapolate(now) >= snapshot.expected_end_time - margin
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[test]
    fn detects_end_from_snapshot() {
        let mut estimator = PositionEstimator::new(1.0);
        estimator.reset(secs(0.0));
        estimator.set_duration(Some(20.0));
        estimator.sample(15.0, secs(0.0));
        estimator.start(secs(0.0));

        let mut tracker = BackgroundTracker::new(secs(1.0));
        tracker.engage(secs(0.0), estimator.peek(secs(0.0)), 20.0);
        assert_eq!(
            tracker.snapshot(),
            Some(BackgroundSnapshot {
                video_start_time: 15.0,
                expected_end_time: 20.0
            })
        );

        assert!(tracker.take_due(secs(3.0)));
        assert!(!tracker.reached_end(&estimator, secs(3.0)));
        assert!(tracker.take_due(secs(4.0)));
        assert!(tracker.reached_end(&estimator, secs(4.0)));
    }

    #[test]
    fn disengaged_tracker_never_fires() {
        let mut tracker = BackgroundTracker::new(secs(1.0));
        tracker.engage(secs(0.0), 0.0, 10.0);
        tracker.disengage();
        assert!(!tracker.is_engaged());
        assert!(!tracker.take_due(secs(100.0)));
        assert!(tracker.snapshot().is_none());
    }
}
