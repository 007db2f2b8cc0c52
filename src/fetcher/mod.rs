//! Content fetching.
//!
//! [`ContentFetcher`] is the seam between the orchestrator and the remote
//! feed endpoint. Implementations return a normalized [`FeedPage`]: the
//! endpoint's inconsistent "more pages" shapes are resolved once, in
//! [`normalize::resolve_has_more`], and never leak past this module.
//!
//! Fetchers do not retry. Recovery is the orchestrator's concern (currently
//! user-triggered refresh only).

mod http;
pub mod normalize;

pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::Result;
use crate::filter::AccessToken;
use crate::types::{FeedPage, TagSet, Visibility};

/// Parameters for one page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub visibility: Visibility,
    /// Zero-based page index.
    pub page: u32,
    pub tags: TagSet,
    /// Credentials to send, if any.
    pub token: Option<AccessToken>,
}

/// Source of feed pages.
///
/// Errors are surfaced unchanged to the orchestrator, which converts them
/// into render instructions.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetcher name for logging/debugging.
    fn name(&self) -> &str;

    /// Fetch one page of the feed described by `request`.
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage>;
}
