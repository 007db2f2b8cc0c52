//! Feed orchestration.
//!
//! [`FeedManager`] composes the other components into one feed view:
//!
//! ```text
//! trigger ─▶ FeedManager ─▶ FilterState (key, credentials)
//!                │
//!                ├─▶ CacheStore (hit? render and stop)
//!                ├─▶ RateLimiter (pagination only)
//!                ├─▶ ContentFetcher (page N, with deadline)
//!                └─▶ FeedObserver(s) (render instructions)
//! ```
//!
//! Triggers are plain method calls: [`FeedManager::on_filter_changed`],
//! [`FeedManager::on_tags_changed`], [`FeedManager::on_scroll_near_end`],
//! [`FeedManager::refresh`]. Mutations from elsewhere in the app enter through
//! [`FeedManager::add_item_to_top`], [`FeedManager::remove_item`] and
//! [`FeedManager::on_item_visibility_toggled`].

mod builder;
mod manager;
mod observer;
mod outcome;

pub use builder::FeedManagerBuilder;
pub use manager::FeedManager;
pub use observer::{FeedObserver, ViewportProbe};
pub use outcome::{FeedPhase, LoadOutcome, SkipReason};
