//! Playback of remote media: controller, position estimation, timers.

pub mod background;
pub mod controller;
pub mod estimator;
pub mod session;
pub mod timer;
