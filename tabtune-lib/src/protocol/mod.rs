//! Message protocol spoken with the remote player embed.
//!
//! Outbound traffic is a closed set of [`Command`]s. Inbound traffic is parsed
//! once at the boundary into [`EmbedEvent`]; anything outside the known shapes
//! is rejected with a [`ProtocolError`] instead of being guessed at.

mod error;

use serde::Deserialize;
use serde_json::{json, Value};

pub use error::ProtocolError;

/// Origins accepted for inbound embed messages when nothing else is configured.
pub const DEFAULT_TRUSTED_ORIGINS: [&str; 2] = ["https://www.youtube.com", "https://youtube.com"];

/// Remote-control command posted to the embed's content window.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PlayVideo,
    PauseVideo,
    SeekTo { seconds: f64, allow_seek_ahead: bool },
    SetVolume(u8),
    Mute,
    UnMute,
    GetDuration,
    GetCurrentTime,
}

impl Command {
    /// Name of the embed API function this command invokes.
    pub fn func(&self) -> &'static str {
        match self {
            Self::PlayVideo => "playVideo",
            Self::PauseVideo => "pauseVideo",
            Self::SeekTo { .. } => "seekTo",
            Self::SetVolume(_) => "setVolume",
            Self::Mute => "mute",
            Self::UnMute => "unMute",
            Self::GetDuration => "getDuration",
            Self::GetCurrentTime => "getCurrentTime",
        }
    }

    fn args(&self) -> Vec<Value> {
        match self {
            Self::SeekTo {
                seconds,
                allow_seek_ahead,
            } => vec![json!(seconds), json!(allow_seek_ahead)],
            Self::SetVolume(volume) => vec![json!((*volume).min(100))],
            _ => Vec::new(),
        }
    }

    /// Serialize into the wire form `{"event":"command","func":..,"args":[..]}`.
    pub fn to_message(&self) -> String {
        json!({
            "event": "command",
            "func": self.func(),
            "args": self.args(),
        })
        .to_string()
    }
}

/// Player state codes reported through `onStateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStateCode {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerStateCode {
    pub fn from_code(code: i64) -> Result<Self, ProtocolError> {
        match code {
            -1 => Ok(Self::Unstarted),
            0 => Ok(Self::Ended),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Buffering),
            5 => Ok(Self::Cued),
            other => Err(ProtocolError::UnknownStateCode(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Event delivered by the embed.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedEvent {
    Ready,
    StateChange(PlayerStateCode),
    InfoDelivery {
        current_time: Option<f64>,
        duration: Option<f64>,
    },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    info: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInfo {
    current_time: Option<f64>,
    duration: Option<f64>,
}

/// Validator for inbound embed messages.
#[derive(Debug, Clone)]
pub struct Inbound {
    trusted_origins: Vec<String>,
}

impl Default for Inbound {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_ORIGINS.iter().map(|o| o.to_string()).collect())
    }
}

impl Inbound {
    pub fn new(trusted_origins: Vec<String>) -> Self {
        Self { trusted_origins }
    }

    pub fn is_trusted(&self, origin: &str) -> bool {
        self.trusted_origins.iter().any(|trusted| trusted == origin)
    }

    /// Validate the origin and decode a raw message payload.
    ///
    /// # Errors
    ///
    /// Returns an error for untrusted origins, payloads that are not JSON
    /// objects, unknown event names, and malformed `info` fields.
    pub fn parse(&self, origin: &str, data: &str) -> Result<EmbedEvent, ProtocolError> {
        if !self.is_trusted(origin) {
            return Err(ProtocolError::UntrustedOrigin(origin.to_string()));
        }
        if data.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }

        let envelope: RawEnvelope = serde_json::from_str(data)?;
        match envelope.event.as_str() {
            "onReady" => Ok(EmbedEvent::Ready),
            "onStateChange" => {
                let code = envelope
                    .info
                    .as_i64()
                    .ok_or_else(|| ProtocolError::MalformedInfo("state code".to_string()))?;
                Ok(EmbedEvent::StateChange(PlayerStateCode::from_code(code)?))
            }
            "infoDelivery" => {
                let info: RawInfo = if envelope.info.is_null() {
                    RawInfo::default()
                } else {
                    serde_json::from_value(envelope.info)
                        .map_err(|err| ProtocolError::MalformedInfo(err.to_string()))?
                };
                Ok(EmbedEvent::InfoDelivery {
                    current_time: info.current_time,
                    duration: info.duration,
                })
            }
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// Build the embed URL that loads `media_id` with the JS API enabled.
pub fn embed_url(embed_host: &str, media_id: &str, page_origin: &str) -> String {
    format!(
        "{}/embed/{}?enablejsapi=1&autoplay=1&controls=0&disablekb=1&modestbranding=1&fs=0&rel=0&origin={}",
        embed_host.trim_end_matches('/'),
        urlencoding::encode(media_id),
        urlencoding::encode(page_origin)
    )
}
