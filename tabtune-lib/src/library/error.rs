use std::fmt::{Display, Formatter};

use super::Collection;

/// Error type for rejected library edits.
///
/// None of these are fatal; callers turn them into user notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    Duplicate {
        collection: Collection,
        media_id: String,
    },
    NotFound {
        collection: Collection,
        media_id: String,
    },
    UnknownPlaylist(String),
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
    EmptyName,
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate {
                collection,
                media_id,
            } => write!(f, "{} already in {}", media_id, collection),
            Self::NotFound {
                collection,
                media_id,
            } => write!(f, "{} not in {}", media_id, collection),
            Self::UnknownPlaylist(id) => write!(f, "unknown playlist: {}", id),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for queue of {}", index, len)
            }
            Self::EmptyName => write!(f, "playlist name is empty"),
        }
    }
}

impl std::error::Error for LibraryError {}
