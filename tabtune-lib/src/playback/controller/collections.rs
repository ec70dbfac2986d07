//! Queue, favorites and playlist operations exposed through the controller.
//!
//! These wrap [`Library`](crate::library::Library) edits with the user-facing
//! notices and change events the UI listens for.

use log::{info, warn};

use crate::catalog::{extract_video_id, Catalog};
use crate::library::{Collection, KeyValueStore, LibraryError, MediaInfo};

use super::{EmbedPort, Notice, PlayerController, PlayerEvent};

/// Initial tracks of a new playlist.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistSource {
    Empty,
    /// Snapshot of the current queue.
    Queue,
    Media(MediaInfo),
}

/// User-visible text for a rejected library edit.
fn notice_for(err: &LibraryError) -> Notice {
    match err {
        LibraryError::Duplicate {
            collection: Collection::Queue,
            ..
        } => Notice::info("Already in queue"),
        LibraryError::Duplicate {
            collection: Collection::Favorites,
            ..
        } => Notice::info("Already in favorites"),
        LibraryError::Duplicate {
            collection: Collection::Playlist,
            ..
        } => Notice::info("Video already in playlist"),
        LibraryError::EmptyName => Notice::error("Please enter a playlist name"),
        LibraryError::UnknownPlaylist(_) => Notice::error("Playlist not found"),
        LibraryError::NotFound { collection, .. } => {
            Notice::error(format!("Not in {}", collection))
        }
        LibraryError::IndexOutOfRange { .. } => Notice::error("No such queue entry"),
    }
}

impl<E: EmbedPort, S: KeyValueStore> PlayerController<E, S> {
    fn reject(&mut self, err: LibraryError) {
        info!("{}", err);
        let notice = notice_for(&err);
        self.notify(notice);
    }

    // Queue

    /// Append to the queue, optionally starting it right away.
    ///
    /// Returns the queue index, or `None` when the media was already queued.
    pub fn add_to_queue(&mut self, info: MediaInfo, play_now: bool) -> Option<usize> {
        self.remember(info.clone());
        let index = match self.library.add_to_queue(&info) {
            Ok(index) => index,
            Err(err) => {
                self.reject(err);
                return None;
            }
        };
        self.notify(Notice::success("Added to queue"));
        self.emit(PlayerEvent::QueueChanged);
        if play_now {
            self.play_queue_index(index);
        }
        Some(index)
    }

    /// Play the queue entry at `index`.
    pub fn play_queue_index(&mut self, index: usize) {
        let Some(entry) = self.library.queue().get(index).cloned() else {
            let len = self.library.queue().len();
            self.reject(LibraryError::IndexOutOfRange { index, len });
            return;
        };
        self.active_playlist = None;
        self.play(&entry.id, &entry.title, &entry.thumbnail, Some(index));
        self.emit(PlayerEvent::QueueChanged);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> bool {
        match self.library.remove_from_queue(index) {
            Ok(removed) => {
                info!("removed {} from queue", removed.id);
                self.notify(Notice::info("Removed from queue"));
                self.emit(PlayerEvent::QueueChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    pub fn clear_queue(&mut self) {
        if self.library.clear_queue() {
            self.notify(Notice::info("Queue cleared"));
            self.emit(PlayerEvent::QueueChanged);
        }
    }

    // Favorites

    pub fn is_favorite(&self, media_id: &str) -> bool {
        self.library.is_favorite(media_id)
    }

    pub fn add_to_favorites(&mut self, info: MediaInfo) -> bool {
        self.remember(info.clone());
        match self.library.add_favorite(&info) {
            Ok(()) => {
                self.notify(Notice::success("Added to favorites"));
                self.emit(PlayerEvent::FavoritesChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    pub fn remove_from_favorites(&mut self, media_id: &str) -> bool {
        match self.library.remove_favorite(media_id) {
            Ok(_) => {
                self.notify(Notice::info("Removed from favorites"));
                self.emit(PlayerEvent::FavoritesChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Flip favorite membership of the media currently loaded.
    pub fn toggle_current_favorite(&mut self) {
        let Some(info) = self.current_info() else {
            return;
        };
        if self.library.is_favorite(&info.id) {
            self.remove_from_favorites(&info.id);
        } else {
            self.add_to_favorites(info);
        }
    }

    fn current_info(&self) -> Option<MediaInfo> {
        let session = self.session.as_ref()?;
        let cached = self.media_cache.get(&session.media_id);
        Some(MediaInfo {
            id: session.media_id.clone(),
            title: session.title.clone(),
            thumbnail: session.thumbnail.clone(),
            duration: session
                .duration()
                .map(|d| d as u32)
                .or_else(|| cached.map(|info| info.duration))
                .unwrap_or(0),
        })
    }

    // Playlists

    /// Create a playlist and return its id.
    pub fn create_playlist(
        &mut self,
        name: &str,
        description: &str,
        source: PlaylistSource,
    ) -> Option<String> {
        let tracks = match source {
            PlaylistSource::Empty => Vec::new(),
            PlaylistSource::Queue => self.library.queue().entries().to_vec(),
            PlaylistSource::Media(info) => {
                let entry = info.to_entry();
                self.remember(info);
                vec![entry]
            }
        };
        match self.library.create_playlist(name, description, tracks) {
            Ok(id) => {
                self.notify(Notice::success("Playlist created successfully"));
                self.emit(PlayerEvent::PlaylistsChanged);
                Some(id)
            }
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    pub fn add_to_playlist(&mut self, playlist_id: &str, info: MediaInfo) -> bool {
        self.remember(info.clone());
        match self.library.add_to_playlist(playlist_id, &info) {
            Ok(()) => {
                self.notify(Notice::success("Added to playlist"));
                self.emit(PlayerEvent::PlaylistsChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    pub fn remove_from_playlist(&mut self, playlist_id: &str, media_id: &str) -> bool {
        match self.library.remove_from_playlist(playlist_id, media_id) {
            Ok(_) => {
                self.notify(Notice::info("Track removed from playlist"));
                self.emit(PlayerEvent::PlaylistsChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Delete a playlist. Deleting the active playlist deactivates it.
    pub fn delete_playlist(&mut self, playlist_id: &str) -> bool {
        match self.library.delete_playlist(playlist_id) {
            Ok(removed) => {
                if self.active_playlist.as_deref() == Some(playlist_id) {
                    self.active_playlist = None;
                }
                info!("deleted playlist {} ({})", removed.name, removed.id);
                self.notify(Notice::info("Playlist deleted"));
                self.emit(PlayerEvent::PlaylistsChanged);
                true
            }
            Err(err) => {
                self.reject(err);
                false
            }
        }
    }

    /// Play one track of a playlist without touching the queue.
    ///
    /// The playlist becomes active, so the automatic advance continues with
    /// its following tracks once the queue has nothing left.
    pub fn play_playlist_track(&mut self, playlist_id: &str, index: usize) {
        let Some(track) = self
            .library
            .playlist(playlist_id)
            .and_then(|playlist| playlist.tracks.get(index))
            .cloned()
        else {
            self.reject(LibraryError::UnknownPlaylist(playlist_id.to_string()));
            return;
        };
        self.active_playlist = Some(playlist_id.to_string());
        self.library.set_queue_current(None);
        self.play(&track.id, &track.title, &track.thumbnail, None);
    }

    /// Replace the queue with a playlist's tracks and play from `start`.
    pub fn play_playlist(&mut self, playlist_id: &str, start: usize) {
        let Some(playlist) = self.library.playlist(playlist_id) else {
            self.reject(LibraryError::UnknownPlaylist(playlist_id.to_string()));
            return;
        };
        if playlist.tracks.is_empty() {
            self.notify(Notice::info("Playlist is empty"));
            return;
        }
        let tracks = playlist.tracks.clone();
        let start = start.min(tracks.len() - 1);
        for track in &tracks {
            self.media_cache.insert(track.id.clone(), track.info());
        }
        self.library.replace_queue(tracks);
        self.emit(PlayerEvent::QueueChanged);
        self.notify(Notice::success("Playing playlist"));

        self.play_queue_index(start);
        self.active_playlist = Some(playlist_id.to_string());
    }

    // Search and lookup

    /// Replace the search results consulted after the queue and playlist.
    pub fn set_search_results(&mut self, results: Vec<MediaInfo>) {
        for info in &results {
            self.media_cache.insert(info.id.clone(), info.clone());
        }
        self.search_results = results;
    }

    /// Play a search result without queueing it.
    pub fn play_search_result(&mut self, index: usize) {
        let Some(info) = self.search_results.get(index).cloned() else {
            return;
        };
        self.active_playlist = None;
        self.library.set_queue_current(None);
        self.play(&info.id, &info.title, &info.thumbnail, None);
    }

    /// Run a catalog search and store its results.
    pub fn search(&mut self, query: &str, catalog: &dyn Catalog) -> usize {
        let query = query.trim();
        if query.is_empty() {
            return 0;
        }
        match catalog.search(query) {
            Ok(results) => {
                let results: Vec<MediaInfo> =
                    results.iter().map(|result| result.to_media_info()).collect();
                let count = results.len();
                self.set_search_results(results);
                count
            }
            Err(err) => {
                warn!("search for {:?} failed: {}", query, err);
                self.notify(Notice::error(format!("Error searching for \"{}\": {}", query, err)));
                0
            }
        }
    }

    /// Resolve a video URL through the catalog and add it to favorites.
    pub fn add_by_url(&mut self, url: &str, catalog: &dyn Catalog) -> bool {
        let url = url.trim();
        if url.is_empty() {
            self.notify(Notice::error("Please enter a YouTube URL"));
            return false;
        }
        let Some(media_id) = extract_video_id(url) else {
            self.notify(Notice::error("Invalid YouTube URL"));
            return false;
        };
        match catalog.video(&media_id) {
            Ok(video) => self.add_to_favorites(video.to_media_info(&media_id)),
            Err(err) => {
                warn!("lookup of {} failed: {}", media_id, err);
                self.notify(Notice::error("Error fetching video information"));
                false
            }
        }
    }
}
