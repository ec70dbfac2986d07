//! # Tabtune Library
//!
//! Playback core for the new-tab side-panel player. The player never talks to
//! media directly: it drives a remote embed through asynchronous messages,
//! estimates the playback position between sparse updates, and decides what
//! plays next from the persisted queue, favorites and playlists.

pub mod catalog;
pub mod diagnostics;
pub mod library;
pub mod playback;
pub mod protocol;
pub mod settings;

pub use library::{Library, LibraryError, MediaEntry, MediaInfo, Playlist};
pub use playback::controller::{
    EmbedPort, EndSource, MetadataTicket, Notice, NoticeLevel, PlayerController, PlayerEvent,
    PlaylistSource,
};
pub use playback::timer::{Clock, ManualClock, SystemClock};
pub use settings::PlayerSettings;
