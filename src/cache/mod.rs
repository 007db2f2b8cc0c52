//! Feed page cache.
//!
//! [`CacheStore`] maps a [`CacheKey`](crate::CacheKey) (visibility filter +
//! tag set) to a [`CacheEntry`] accumulating every page loaded for that view.
//! All operations are synchronous and touch nothing but the store itself.
//!
//! The store is shareable (`Arc<CacheStore>`) between several feed views;
//! invalidation then affects all of them, which is what a visibility toggle
//! elsewhere in the app needs.

mod entry;
mod store;

pub use entry::CacheEntry;
pub use store::{CacheConfig, CacheStore};
