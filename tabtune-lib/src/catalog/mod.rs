//! Search and metadata lookups against the video catalog endpoint.
//!
//! The endpoint is an external collaborator; this module only defines the
//! response shapes, the parsing helpers the player needs, and a blocking HTTP
//! client behind the `http` feature.

mod error;
#[cfg(feature = "http")]
mod http;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::library::MediaInfo;

pub use error::CatalogError;
#[cfg(feature = "http")]
pub use http::HttpCatalog;

/// Metadata returned by `/api/video?id=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoInfo {
    pub title: String,
    pub thumbnail_url: String,
    /// `m:ss` or `h:mm:ss`.
    pub duration: String,
    pub channel_name: String,
}

impl VideoInfo {
    pub fn to_media_info(&self, media_id: &str) -> MediaInfo {
        MediaInfo {
            id: media_id.to_string(),
            title: self.title.clone(),
            thumbnail: self.thumbnail_url.clone(),
            duration: parse_duration(&self.duration),
        }
    }
}

/// One hit from `/api/search?q=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub views: u64,
    pub channel_name: String,
}

impl SearchResult {
    pub fn to_media_info(&self) -> MediaInfo {
        MediaInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail_url.clone(),
            duration: parse_duration(&self.duration),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// Source of video metadata and search results.
pub trait Catalog {
    fn video(&self, media_id: &str) -> Result<VideoInfo, CatalogError>;
    fn search(&self, query: &str) -> Result<Vec<SearchResult>, CatalogError>;
}

/// Parse `m:ss` or `h:mm:ss` into seconds. Anything else is 0.
pub fn parse_duration(duration: &str) -> u32 {
    let parts: Option<Vec<u32>> = duration
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect();
    let total = match parts.as_deref() {
        Some([minutes, seconds]) => clock_seconds(0, *minutes, *seconds),
        Some([hours, minutes, seconds]) => clock_seconds(*hours, *minutes, *seconds),
        _ => None,
    };
    total.unwrap_or(0)
}

fn clock_seconds(hours: u32, minutes: u32, seconds: u32) -> Option<u32> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Compact view count, e.g. `1.2K` or `3.4M`.
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^.*((youtu\.be/)|(v/)|(/u/\w/)|(embed/)|(watch\?))\??v?=?([^#&?]*).*")
            .expect("static video url pattern")
    })
}

fn is_bare_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pull the 11-character video id out of a share, watch, or embed URL.
///
/// A bare id is accepted as is.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if is_bare_id(url) {
        return Some(url.to_string());
    }
    let captures = url_pattern().captures(url)?;
    let id = captures.get(7)?.as_str();
    if id.len() == 11 {
        Some(id.to_string())
    } else {
        None
    }
}
