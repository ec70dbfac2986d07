//! Persisted queue, favorites and playlists.
//!
//! Every mutation edits the in-memory collection and then rewrites the whole
//! collection under its storage key. A failed write is logged and otherwise
//! ignored: memory and storage stay diverged until the next successful write.

mod error;
mod queue;
pub mod storage;

use std::time::SystemTime;

use log::{debug, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use error::LibraryError;
pub use queue::{adjust_current_after_removal, Queue};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub const QUEUE_KEY: &str = "yt-queue";
pub const FAVORITES_KEY: &str = "yt-favorites";
pub const PLAYLISTS_KEY: &str = "yt-playlists";

/// Wall-clock milliseconds since the Unix epoch, used for `addedAt` stamps.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Known metadata for a media id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    /// Seconds; 0 when not known.
    pub duration: u32,
}

impl MediaInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail: String::new(),
            duration,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    pub fn to_entry(&self) -> MediaEntry {
        MediaEntry {
            id: self.id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            duration: self.duration,
            added_at: now_ms(),
        }
    }
}

/// Queue entry, favorite, or playlist track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub added_at: u64,
}

impl MediaEntry {
    pub fn info(&self) -> MediaInfo {
        MediaInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            thumbnail: self.thumbnail.clone(),
            duration: self.duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub tracks: Vec<MediaEntry>,
}

impl Playlist {
    pub fn contains(&self, media_id: &str) -> bool {
        self.tracks.iter().any(|track| track.id == media_id)
    }

    pub fn position(&self, media_id: &str) -> Option<usize> {
        self.tracks.iter().position(|track| track.id == media_id)
    }
}

/// Persisted collection name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Queue,
    Favorites,
    Playlist,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Self::Queue => QUEUE_KEY,
            Self::Favorites => FAVORITES_KEY,
            Self::Playlist => PLAYLISTS_KEY,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queue => write!(f, "queue"),
            Self::Favorites => write!(f, "favorites"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

pub struct Library<S: KeyValueStore> {
    store: S,
    queue: Queue,
    favorites: Vec<MediaEntry>,
    playlists: Vec<Playlist>,
}

impl<S: KeyValueStore> Library<S> {
    /// Empty library over `store`; nothing is read.
    pub fn new(store: S) -> Self {
        Self {
            store,
            queue: Queue::default(),
            favorites: Vec::new(),
            playlists: Vec::new(),
        }
    }

    /// Library populated from `store`.
    ///
    /// Missing keys load as empty collections; unreadable or corrupt ones are
    /// logged and also load as empty.
    pub fn load(store: S) -> Self {
        let favorites = read_collection(&store, FAVORITES_KEY);
        let playlists = read_collection(&store, PLAYLISTS_KEY);
        let queue = Queue::from_entries(read_collection(&store, QUEUE_KEY));
        debug!(
            "library loaded: {} queued, {} favorites, {} playlists",
            queue.len(),
            favorites.len(),
            playlists.len()
        );
        Self {
            store,
            queue,
            favorites,
            playlists,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn favorites(&self) -> &[MediaEntry] {
        &self.favorites
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, playlist_id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == playlist_id)
    }

    // Queue

    pub fn add_to_queue(&mut self, info: &MediaInfo) -> Result<usize, LibraryError> {
        let index = self.queue.push(info.to_entry())?;
        self.persist(Collection::Queue);
        Ok(index)
    }

    pub fn remove_from_queue(&mut self, index: usize) -> Result<MediaEntry, LibraryError> {
        let removed = self.queue.remove(index)?;
        self.persist(Collection::Queue);
        Ok(removed)
    }

    /// Empty the queue. Returns `false` when it was already empty.
    pub fn clear_queue(&mut self) -> bool {
        if self.queue.is_empty() {
            return false;
        }
        self.queue.clear();
        self.persist(Collection::Queue);
        true
    }

    pub fn replace_queue(&mut self, entries: Vec<MediaEntry>) {
        self.queue.replace(entries);
        self.persist(Collection::Queue);
    }

    pub fn set_queue_current(&mut self, current: Option<usize>) {
        self.queue.set_current(current);
    }

    // Favorites

    pub fn is_favorite(&self, media_id: &str) -> bool {
        self.favorites.iter().any(|entry| entry.id == media_id)
    }

    /// Add to the front of the favorites list.
    pub fn add_favorite(&mut self, info: &MediaInfo) -> Result<(), LibraryError> {
        if self.is_favorite(&info.id) {
            return Err(LibraryError::Duplicate {
                collection: Collection::Favorites,
                media_id: info.id.clone(),
            });
        }
        self.favorites.insert(0, info.to_entry());
        self.persist(Collection::Favorites);
        Ok(())
    }

    pub fn remove_favorite(&mut self, media_id: &str) -> Result<MediaEntry, LibraryError> {
        let index = self
            .favorites
            .iter()
            .position(|entry| entry.id == media_id)
            .ok_or_else(|| LibraryError::NotFound {
                collection: Collection::Favorites,
                media_id: media_id.to_string(),
            })?;
        let removed = self.favorites.remove(index);
        self.persist(Collection::Favorites);
        Ok(removed)
    }

    // Playlists

    /// Create a playlist and return its id.
    pub fn create_playlist(
        &mut self,
        name: &str,
        description: &str,
        tracks: Vec<MediaEntry>,
    ) -> Result<String, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }

        let created_at = now_ms();
        let suffix: u32 = rand::thread_rng().gen_range(0..0x10000);
        let id = format!("playlist_{}_{:04x}", created_at, suffix);
        self.playlists.push(Playlist {
            id: id.clone(),
            name: name.to_string(),
            description: description.trim().to_string(),
            created_at,
            tracks,
        });
        self.persist(Collection::Playlist);
        Ok(id)
    }

    pub fn add_to_playlist(
        &mut self,
        playlist_id: &str,
        info: &MediaInfo,
    ) -> Result<(), LibraryError> {
        let playlist = self.playlist_mut(playlist_id)?;
        if playlist.contains(&info.id) {
            return Err(LibraryError::Duplicate {
                collection: Collection::Playlist,
                media_id: info.id.clone(),
            });
        }
        playlist.tracks.push(info.to_entry());
        self.persist(Collection::Playlist);
        Ok(())
    }

    pub fn remove_from_playlist(
        &mut self,
        playlist_id: &str,
        media_id: &str,
    ) -> Result<MediaEntry, LibraryError> {
        let playlist = self.playlist_mut(playlist_id)?;
        let index = playlist
            .position(media_id)
            .ok_or_else(|| LibraryError::NotFound {
                collection: Collection::Playlist,
                media_id: media_id.to_string(),
            })?;
        let removed = playlist.tracks.remove(index);
        self.persist(Collection::Playlist);
        Ok(removed)
    }

    pub fn delete_playlist(&mut self, playlist_id: &str) -> Result<Playlist, LibraryError> {
        let index = self
            .playlists
            .iter()
            .position(|p| p.id == playlist_id)
            .ok_or_else(|| LibraryError::UnknownPlaylist(playlist_id.to_string()))?;
        let removed = self.playlists.remove(index);
        self.persist(Collection::Playlist);
        Ok(removed)
    }

    fn playlist_mut(&mut self, playlist_id: &str) -> Result<&mut Playlist, LibraryError> {
        self.playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| LibraryError::UnknownPlaylist(playlist_id.to_string()))
    }

    /// Rewrite one collection in full.
    fn persist(&mut self, collection: Collection) {
        let encoded = match collection {
            Collection::Queue => serde_json::to_string(self.queue.entries()),
            Collection::Favorites => serde_json::to_string(&self.favorites),
            Collection::Playlist => serde_json::to_string(&self.playlists),
        };
        let result = match encoded {
            Ok(encoded) => self.store.set(collection.key(), &encoded),
            Err(err) => {
                warn!("failed to encode {}: {}", collection, err);
                return;
            }
        };
        if let Err(err) = result {
            warn!("failed to save {}: {}", collection, err);
        }
    }
}

fn read_collection<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Vec<T> {
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("ignoring corrupt {}: {}", key, err);
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!("failed to read {}: {}", key, err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    fn info(id: &str) -> MediaInfo {
        MediaInfo::new(id, format!("Title {}", id), 120)
    }

    #[test]
    fn mutations_are_written_in_full() {
        let mut library = Library::new(MemoryStore::new());
        library.add_to_queue(&info("a")).unwrap();
        library.add_to_queue(&info("b")).unwrap();

        let raw = library.store().get(QUEUE_KEY).unwrap().unwrap();
        let stored: Vec<MediaEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(raw.contains("\"addedAt\""));
    }

    #[test]
    fn load_restores_all_collections() {
        let mut library = Library::new(MemoryStore::new());
        library.add_to_queue(&info("a")).unwrap();
        library.add_favorite(&info("f")).unwrap();
        library
            .create_playlist("Mix", "", vec![info("t").to_entry()])
            .unwrap();

        let store = library.store().clone();
        let reloaded = Library::load(store);
        assert_eq!(reloaded.queue().len(), 1);
        assert_eq!(reloaded.favorites()[0].id, "f");
        assert_eq!(reloaded.playlists()[0].tracks[0].id, "t");
        assert_eq!(reloaded.queue().current(), None);
    }

    #[test]
    fn corrupt_keys_load_empty() {
        let mut store = MemoryStore::new();
        store.set(FAVORITES_KEY, "{not json").unwrap();
        let library = Library::load(store);
        assert!(library.favorites().is_empty());
    }

    #[test]
    fn favorites_insert_at_front_and_reject_duplicates() {
        let mut library = Library::new(MemoryStore::new());
        library.add_favorite(&info("a")).unwrap();
        library.add_favorite(&info("b")).unwrap();
        assert_eq!(library.favorites()[0].id, "b");

        let err = library.add_favorite(&info("a")).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::Duplicate {
                collection: Collection::Favorites,
                ..
            }
        ));
        assert_eq!(library.favorites().len(), 2);
    }

    #[test]
    fn playlist_lifecycle() {
        let mut library = Library::new(MemoryStore::new());
        assert!(matches!(
            library.create_playlist("   ", "", Vec::new()),
            Err(LibraryError::EmptyName)
        ));

        let id = library.create_playlist(" Focus ", " deep work ", Vec::new()).unwrap();
        let playlist = library.playlist(&id).unwrap();
        assert_eq!(playlist.name, "Focus");
        assert_eq!(playlist.description, "deep work");
        assert!(playlist.tracks.is_empty());

        library.add_to_playlist(&id, &info("a")).unwrap();
        assert!(matches!(
            library.add_to_playlist(&id, &info("a")),
            Err(LibraryError::Duplicate { .. })
        ));
        assert_eq!(library.playlist(&id).unwrap().tracks.len(), 1);
        assert!(matches!(
            library.add_to_playlist("missing", &info("b")),
            Err(LibraryError::UnknownPlaylist(_))
        ));

        library.remove_from_playlist(&id, "a").unwrap();
        assert!(library.playlist(&id).unwrap().tracks.is_empty());

        library.delete_playlist(&id).unwrap();
        assert!(library.playlists().is_empty());
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut library = Library::new(FailingStore);
        library.add_to_queue(&info("a")).unwrap();
        assert_eq!(library.queue().len(), 1);
        assert!(library.clear_queue());
        assert!(!library.clear_queue());
    }
}
