//! Cache key for a feed view.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{TagSet, Visibility};

/// Identity of a feed view: visibility filter plus tag set.
///
/// Two keys are equal iff the filters match and the tag sets are set-equal;
/// [`TagSet`] is canonical, so input order never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub visibility: Visibility,
    pub tags: TagSet,
}

impl CacheKey {
    pub fn new(visibility: Visibility, tags: TagSet) -> Self {
        Self { visibility, tags }
    }

    /// Key for an unrestricted view of `visibility`.
    pub fn untagged(visibility: Visibility) -> Self {
        Self::new(visibility, TagSet::empty())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.visibility, self.tags)
    }
}
