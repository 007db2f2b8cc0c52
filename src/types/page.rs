//! Normalized page of feed results.

use super::ImageRecord;

/// One page of results after response-shape normalization.
///
/// `has_more` is already resolved (see
/// [`resolve_has_more`](crate::fetcher::normalize::resolve_has_more)); callers
/// never see the raw wire shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub images: Vec<ImageRecord>,
    pub has_more: bool,
}

impl FeedPage {
    pub fn new(images: Vec<ImageRecord>, has_more: bool) -> Self {
        Self { images, has_more }
    }

    /// A page with no results and no continuation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
