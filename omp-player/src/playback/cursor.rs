//! Playlist cursor
//!
//! Ordered items plus a current index. Navigation wraps modulo the playlist
//! length; replacing the items resets the selection so a stale index can
//! never silently play an unrelated item.

use crate::error::{Error, Result};
use omp_common::MediaItem;
use rand::seq::SliceRandom;
use std::sync::Arc;
use uuid::Uuid;

pub struct PlaylistCursor {
    items: Vec<Arc<MediaItem>>,
    current_index: Option<usize>,
}

impl Default for PlaylistCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistCursor {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            current_index: None,
        }
    }

    /// Replace the playlist wholesale; the selection resets to none
    pub fn replace_items(&mut self, items: Vec<Arc<MediaItem>>) {
        self.items = items;
        self.current_index = None;
    }

    /// Select the item at `index`
    pub fn select_index(&mut self, index: usize) -> Result<Arc<MediaItem>> {
        if index >= self.items.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.current_index = Some(index);
        Ok(self.items[index].clone())
    }

    /// Advance to the next item, wrapping past the end to index 0
    ///
    /// With no selection the first item is selected. Empty playlist returns
    /// `None` and leaves the cursor untouched.
    pub fn next(&mut self) -> Option<Arc<MediaItem>> {
        if self.items.is_empty() {
            return None;
        }
        let index = match self.current_index {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        };
        self.current_index = Some(index);
        Some(self.items[index].clone())
    }

    /// Step to the previous item, wrapping before index 0 to the end
    pub fn previous(&mut self) -> Option<Arc<MediaItem>> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        let index = match self.current_index {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        self.current_index = Some(index);
        Some(self.items[index].clone())
    }

    /// Randomly reorder the playlist
    ///
    /// A selected item stays selected; its index follows it to the new
    /// position.
    pub fn shuffle(&mut self) {
        let current_id = self.current().map(|item| item.id);
        self.items.shuffle(&mut rand::thread_rng());
        self.current_index = current_id.and_then(|id| self.position_of(id));
    }

    pub fn current(&self) -> Option<Arc<MediaItem>> {
        self.current_index.map(|i| self.items[i].clone())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Index of the item with `id`, if present
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn items(&self) -> &[Arc<MediaItem>] {
        &self.items
    }

    pub fn item_ids(&self) -> Vec<Uuid> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omp_common::MediaKind;

    fn items(n: usize) -> Vec<Arc<MediaItem>> {
        (0..n)
            .map(|i| {
                Arc::new(MediaItem {
                    id: Uuid::new_v4(),
                    kind: MediaKind::Audio,
                    title: format!("Item {}", i),
                    artist: "Artist".to_string(),
                    duration_secs: Some(60.0),
                    media_url: format!("https://media.example/{}.mp3", i),
                    artwork_url: None,
                    category: None,
                    album: None,
                    year: None,
                    featured: false,
                    tags: Vec::new(),
                })
            })
            .collect()
    }

    fn cursor(n: usize) -> PlaylistCursor {
        let mut c = PlaylistCursor::new();
        c.replace_items(items(n));
        c
    }

    #[test]
    fn test_select_index_bounds() {
        let mut c = cursor(3);

        let item = c.select_index(1).unwrap();
        assert_eq!(item.title, "Item 1");
        assert_eq!(c.current_index(), Some(1));

        let err = c.select_index(3).unwrap_err();
        match err {
            Error::OutOfRange { index, len } => {
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
        // Failed select leaves the cursor untouched
        assert_eq!(c.current_index(), Some(1));
    }

    #[test]
    fn test_next_wraps_and_is_cyclic() {
        let mut c = cursor(4);
        c.select_index(2).unwrap();

        // len calls return to the starting index
        for _ in 0..c.len() {
            c.next();
        }
        assert_eq!(c.current_index(), Some(2));

        c.select_index(3).unwrap();
        let item = c.next().unwrap();
        assert_eq!(item.title, "Item 0");
    }

    #[test]
    fn test_previous_inverts_next() {
        let mut c = cursor(4);
        for start in 0..4 {
            c.select_index(start).unwrap();
            c.next();
            c.previous();
            assert_eq!(c.current_index(), Some(start));
        }
    }

    #[test]
    fn test_previous_wraps_before_start() {
        let mut c = cursor(3);
        c.select_index(0).unwrap();
        let item = c.previous().unwrap();
        assert_eq!(item.title, "Item 2");
    }

    #[test]
    fn test_no_selection_picks_ends() {
        let mut c = cursor(3);
        assert_eq!(c.current_index(), None);
        c.next();
        assert_eq!(c.current_index(), Some(0));

        let mut c = cursor(3);
        c.previous();
        assert_eq!(c.current_index(), Some(2));
    }

    #[test]
    fn test_empty_playlist_navigation() {
        let mut c = PlaylistCursor::new();
        assert!(c.next().is_none());
        assert!(c.previous().is_none());
        assert_eq!(c.current_index(), None);
        assert!(c.is_empty());
    }

    #[test]
    fn test_single_item_returns_itself() {
        let mut c = cursor(1);
        c.select_index(0).unwrap();

        let forward = c.next().unwrap();
        let backward = c.previous().unwrap();
        assert_eq!(forward.id, backward.id);
        assert_eq!(c.current_index(), Some(0));
    }

    #[test]
    fn test_replace_resets_selection() {
        let mut c = cursor(3);
        c.select_index(2).unwrap();

        c.replace_items(items(5));
        assert_eq!(c.current_index(), None);
        assert_eq!(c.len(), 5);
        assert!(c.current().is_none());
    }

    #[test]
    fn test_shuffle_keeps_items_and_selection() {
        let mut c = cursor(8);
        c.select_index(3).unwrap();
        let current_id = c.current().unwrap().id;
        let mut before = c.item_ids();
        before.sort();

        for _ in 0..5 {
            c.shuffle();
            let mut after = c.item_ids();
            after.sort();
            assert_eq!(before, after);
            assert_eq!(c.current().unwrap().id, current_id);
            assert_eq!(c.position_of(current_id), c.current_index());
        }
    }

    #[test]
    fn test_shuffle_without_selection() {
        let mut c = cursor(4);
        c.shuffle();
        assert_eq!(c.current_index(), None);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_position_of() {
        let c = cursor(3);
        let id = c.items()[1].id;
        assert_eq!(c.position_of(id), Some(1));
        assert_eq!(c.position_of(Uuid::new_v4()), None);
    }
}
