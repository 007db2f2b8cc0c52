//! Page-accumulation record for one feed view.

use std::collections::HashSet;

use crate::types::ImageRecord;

/// Everything loaded so far for one cache key.
///
/// `next_page` counts the pages merged into `images`, so it is also the
/// index of the page to request next. `has_more == false` is terminal until
/// the entry is replaced or invalidated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    /// Items in feed order, unique by id.
    pub images: Vec<ImageRecord>,
    pub has_more: bool,
    pub next_page: u32,
    pub is_loaded: bool,
}

impl CacheEntry {
    /// Entry holding the first page of a view.
    ///
    /// Duplicate ids within the page are dropped, keeping the first.
    pub fn first_page(images: Vec<ImageRecord>, has_more: bool) -> Self {
        let mut entry = Self {
            images: Vec::with_capacity(images.len()),
            has_more,
            next_page: 1,
            is_loaded: true,
        };
        entry.merge(images);
        entry
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.images.iter().any(|image| image.id == id)
    }

    /// Append `images` in order, skipping ids already present.
    ///
    /// Returns the records that were actually added.
    pub(crate) fn merge(&mut self, images: Vec<ImageRecord>) -> Vec<ImageRecord> {
        let mut seen: HashSet<String> = self.images.iter().map(|i| i.id.clone()).collect();
        let mut added = Vec::new();
        for image in images {
            if seen.insert(image.id.clone()) {
                self.images.push(image.clone());
                added.push(image);
            }
        }
        added
    }

    /// Insert `image` at the front unless its id is already present.
    pub(crate) fn prepend(&mut self, image: ImageRecord) -> bool {
        if self.contains(&image.id) {
            return false;
        }
        self.images.insert(0, image);
        true
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|image| image.id != id);
        self.images.len() != before
    }
}
