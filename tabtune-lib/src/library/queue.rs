//! Ordered play queue with the index of the entry currently playing.

use super::{Collection, LibraryError, MediaEntry};

/// Current index after removing `removed` from the queue.
///
/// Removing an earlier entry shifts the current one down, removing the
/// current entry clears it, later removals leave it alone.
pub fn adjust_current_after_removal(current: Option<usize>, removed: usize) -> Option<usize> {
    match current {
        Some(current) if removed < current => Some(current - 1),
        Some(current) if removed == current => None,
        other => other,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    entries: Vec<MediaEntry>,
    current: Option<usize>,
}

impl Queue {
    pub fn from_entries(entries: Vec<MediaEntry>) -> Self {
        Self {
            entries,
            current: None,
        }
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaEntry> {
        self.entries.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn set_current(&mut self, current: Option<usize>) {
        self.current = current.filter(|index| *index < self.entries.len());
    }

    pub fn contains(&self, media_id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == media_id)
    }

    /// Append an entry, returning its index.
    pub fn push(&mut self, entry: MediaEntry) -> Result<usize, LibraryError> {
        if self.contains(&entry.id) {
            return Err(LibraryError::Duplicate {
                collection: Collection::Queue,
                media_id: entry.id,
            });
        }
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Result<MediaEntry, LibraryError> {
        if index >= self.entries.len() {
            return Err(LibraryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.current = adjust_current_after_removal(self.current, index);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn replace(&mut self, entries: Vec<MediaEntry>) {
        self.entries = entries;
        self.current = None;
    }

    /// Entry after the current one. With nothing current, the first entry.
    pub fn next_index(&self) -> Option<usize> {
        match self.current {
            Some(current) => Some(current + 1).filter(|next| *next < self.entries.len()),
            None if !self.entries.is_empty() => Some(0),
            None => None,
        }
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.current.and_then(|current| current.checked_sub(1))
    }
}
