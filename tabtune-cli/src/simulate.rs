//! Stand-in for the remote embed, driven by the session loop.
//!
//! It plays back "media" against the shared clock, answers remote-control
//! commands the way the real embed does, and queues its replies as raw
//! JSON messages for the session loop to feed back into the controller.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use log::debug;
use serde_json::{json, Value};
use tabtune_lib::playback::timer::Clock;
use tabtune_lib::protocol::PlayerStateCode;
use tabtune_lib::EmbedPort;

/// Origin the simulated embed posts from.
pub const EMBED_ORIGIN: &str = "https://www.youtube.com";

pub type Inbox = Rc<RefCell<VecDeque<String>>>;

pub struct SimulatedEmbed {
    clock: Box<dyn Clock>,
    inbox: Inbox,
    durations: HashMap<String, f64>,
    fallback_duration: f64,
    media_id: Option<String>,
    duration: f64,
    anchor_position: f64,
    anchor_at: Duration,
    playing: bool,
    ended: bool,
}

impl SimulatedEmbed {
    pub fn new(clock: Box<dyn Clock>, fallback_duration: f64) -> Self {
        Self {
            clock,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            durations: HashMap::new(),
            fallback_duration: fallback_duration.max(1.0),
            media_id: None,
            duration: 0.0,
            anchor_position: 0.0,
            anchor_at: Duration::ZERO,
            playing: false,
            ended: false,
        }
    }

    pub fn inbox(&self) -> Inbox {
        self.inbox.clone()
    }

    /// Length to play `media_id` for.
    pub fn set_duration(&mut self, media_id: &str, seconds: f64) {
        if seconds > 0.0 {
            self.durations.insert(media_id.to_string(), seconds);
        }
    }

    /// Advance playback; reports the end once the media runs out.
    pub fn tick(&mut self) {
        if self.media_id.is_none() || !self.playing || self.ended {
            return;
        }
        if self.position() >= self.duration {
            self.anchor_position = self.duration;
            self.anchor_at = self.clock.now();
            self.playing = false;
            self.ended = true;
            self.send_state(PlayerStateCode::Ended);
        }
    }

    fn position(&self) -> f64 {
        let position = if self.playing {
            self.anchor_position + self.clock.now().saturating_sub(self.anchor_at).as_secs_f64()
        } else {
            self.anchor_position
        };
        position.min(self.duration)
    }

    fn send(&self, message: Value) {
        self.inbox.borrow_mut().push_back(message.to_string());
    }

    fn send_state(&self, state: PlayerStateCode) {
        self.send(json!({ "event": "onStateChange", "info": state.code() }));
    }

    fn set_playing(&mut self, playing: bool) {
        self.anchor_position = self.position();
        self.anchor_at = self.clock.now();
        self.playing = playing;
    }

    fn handle_command(&mut self, func: &str, args: &[Value]) {
        match func {
            "playVideo" => {
                if self.ended {
                    self.anchor_position = 0.0;
                    self.ended = false;
                }
                self.set_playing(true);
                self.send_state(PlayerStateCode::Playing);
            }
            "pauseVideo" => {
                self.set_playing(false);
                self.send_state(PlayerStateCode::Paused);
            }
            "seekTo" => {
                let target = args.first().and_then(Value::as_f64).unwrap_or(0.0);
                self.anchor_position = target.clamp(0.0, self.duration);
                self.anchor_at = self.clock.now();
                self.ended = false;
            }
            "getDuration" => {
                self.send(json!({ "event": "infoDelivery", "info": { "duration": self.duration } }));
            }
            "getCurrentTime" => {
                self.send(json!({
                    "event": "infoDelivery",
                    "info": { "currentTime": self.position() }
                }));
            }
            _ => {}
        }
    }
}

/// Pull the media id out of `<host>/embed/<id>?...`.
fn media_id_from_url(url: &str) -> Option<String> {
    let rest = url.split("/embed/").nth(1)?;
    let id = rest.split(['?', '&', '#']).next()?;
    urlencoding::decode(id).ok().map(|id| id.into_owned())
}

impl EmbedPort for SimulatedEmbed {
    fn has_content_window(&self) -> bool {
        self.media_id.is_some()
    }

    fn load(&mut self, url: &str) {
        let Some(media_id) = media_id_from_url(url) else {
            debug!("simulated embed cannot load {}", url);
            return;
        };
        self.duration = self
            .durations
            .get(&media_id)
            .copied()
            .unwrap_or(self.fallback_duration);
        self.media_id = Some(media_id);
        self.anchor_position = 0.0;
        self.anchor_at = self.clock.now();
        self.playing = true;
        self.ended = false;

        self.send(json!({ "event": "onReady" }));
        self.send_state(PlayerStateCode::Buffering);
        self.send_state(PlayerStateCode::Playing);
    }

    fn post(&mut self, message: &str) {
        let Ok(value) = serde_json::from_str::<Value>(message) else {
            return;
        };
        let func = value["func"].as_str().unwrap_or_default().to_string();
        let args = value["args"].as_array().cloned().unwrap_or_default();
        self.handle_command(&func, &args);
    }
}
