//! Playback status reporting for UI consumers.

pub mod reporter;
