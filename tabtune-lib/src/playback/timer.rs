//! Clocks and cancellable timers for the single-threaded player loop.
//!
//! Nothing here sleeps or spawns. The host calls
//! [`PlayerController::pump`](super::controller::PlayerController::pump) from
//! its event loop, and the controller asks each task whether it is due.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic wall-clock source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.time.set(self.time.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.time.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.time.get()
    }
}

/// Repeating task with explicit start/stop.
///
/// Starting a running task re-arms it, so there is never more than one
/// pending instance.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    interval: Duration,
    next_due: Option<Duration>,
}

impl PeriodicTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Duration) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Consume one due firing, re-arming the task.
    ///
    /// A task that is late by more than one interval fires once and is
    /// re-armed relative to `now`.
    pub fn take_due(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                let mut next = due + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// Deferred single-shot task tagged with the session generation that armed it.
#[derive(Debug, Clone, Default)]
pub struct OneShot {
    due: Option<(Duration, u64)>,
}

impl OneShot {
    pub fn arm(&mut self, now: Duration, delay: Duration, generation: u64) {
        self.due = Some((now + delay, generation));
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.due.map(|(due, _)| due)
    }

    /// Disarm and return the generation if the task is due.
    pub fn take_due(&mut self, now: Duration) -> Option<u64> {
        match self.due {
            Some((due, generation)) if due <= now => {
                self.due = None;
                Some(generation)
            }
            _ => None,
        }
    }
}
