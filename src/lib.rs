//! Vitrine - paginated gallery feed orchestrator
//!
//! This crate drives an image-gallery feed backed by a paginated HTTP
//! endpoint: it loads pages under a visibility filter and tag set, caches
//! every page per view, throttles infinite scroll, and tells an external
//! renderer what to show through [`RenderInstruction`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitrine::{FeedManager, RenderInstruction, TagSet, Visibility};
//!
//! #[tokio::main]
//! async fn main() -> vitrine::Result<()> {
//!     let feed = FeedManager::builder()
//!         .endpoint("https://gallery.example/api/feed")
//!         .observer(Arc::new(|instruction: &RenderInstruction| {
//!             println!("{instruction:?}");
//!         }))
//!         .build()?;
//!
//!     feed.load_initial().await;
//!     feed.on_tags_changed(TagSet::parse("cats, dogs")).await;
//!     feed.on_scroll_near_end().await;
//!     feed.on_filter_changed(Visibility::Private).await; // login required
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod filter;
pub mod telemetry;
pub mod throttle;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheEntry, CacheStore};
pub use config::{Config, EndpointConfig};
pub use error::{Result, VitrineError};
pub use feed::{
    FeedManager, FeedManagerBuilder, FeedObserver, FeedPhase, LoadOutcome, SkipReason,
    ViewportProbe,
};
pub use fetcher::{ContentFetcher, HttpFetcher, PageRequest};
pub use filter::{AccessToken, FilterState};
pub use throttle::{RateLimitConfig, RateLimiter};

// Re-export all types
pub use types::{
    CacheKey, FeedPage, ImageRecord, Placement, RenderInstruction, TagSet, Visibility,
};
