//! Builder for configuring feed managers

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::manager::{FeedState, Inner};
use super::{FeedManager, FeedObserver, ViewportProbe};
use crate::cache::{CacheConfig, CacheStore};
use crate::config::Config;
use crate::fetcher::{ContentFetcher, HttpFetcher};
use crate::filter::{AccessToken, FilterState};
use crate::throttle::{RateLimitConfig, RateLimiter};
use crate::{Result, VitrineError};

/// Default deadline for a single page fetch.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`FeedManager`].
///
/// A content source is required: either [`fetcher`](Self::fetcher) or
/// [`endpoint`](Self::endpoint).
pub struct FeedManagerBuilder {
    fetcher: Option<Arc<dyn ContentFetcher>>,
    endpoint: Option<String>,
    cache: Option<Arc<CacheStore>>,
    cache_config: CacheConfig,
    filter: FilterState,
    rate_limit: RateLimitConfig,
    request_timeout: Duration,
    observers: Vec<Arc<dyn FeedObserver>>,
    viewport: Option<Arc<dyn ViewportProbe>>,
}

impl FeedManagerBuilder {
    pub fn new() -> Self {
        Self {
            fetcher: None,
            endpoint: None,
            cache: None,
            cache_config: CacheConfig::default(),
            filter: FilterState::default(),
            rate_limit: RateLimitConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            observers: Vec::new(),
            viewport: None,
        }
    }

    /// Apply a loaded [`Config`]: endpoint, timeout, token, throttle and
    /// cache settings.
    pub fn config(mut self, config: &Config) -> Self {
        if let Some(url) = &config.endpoint.url {
            self.endpoint = Some(url.clone());
        }
        if let Some(token) = &config.endpoint.access_token {
            self.filter.set_access_token(Some(AccessToken::new(token.clone())));
        }
        self.request_timeout = config.endpoint.request_timeout();
        self.rate_limit = config.rate_limit.clone();
        self.cache_config = config.cache.clone();
        self
    }

    /// Use a custom content fetcher (takes precedence over `endpoint`).
    pub fn fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Fetch pages over HTTP from this endpoint URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Share an existing cache with other feed views.
    pub fn shared_cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configure the cache created for this manager (ignored with
    /// `shared_cache`).
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Initial filter selection.
    pub fn filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.filter.set_access_token(Some(token));
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Deadline for a single page fetch. Default: 30s.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Register an observer. Observers receive instructions in
    /// registration order.
    pub fn observer(mut self, observer: Arc<dyn FeedObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Probe consulted before replaying a scroll trigger after a cooldown.
    pub fn viewport(mut self, probe: Arc<dyn ViewportProbe>) -> Self {
        self.viewport = Some(probe);
        self
    }

    pub fn build(self) -> Result<FeedManager> {
        let fetcher: Arc<dyn ContentFetcher> = match (self.fetcher, self.endpoint) {
            (Some(fetcher), _) => fetcher,
            (None, Some(url)) => Arc::new(HttpFetcher::new(url)?),
            (None, None) => {
                return Err(VitrineError::Configuration(
                    "no content fetcher or endpoint configured".to_string(),
                ));
            }
        };
        if self.request_timeout.is_zero() {
            return Err(VitrineError::Configuration(
                "request timeout must be non-zero".to_string(),
            ));
        }

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(CacheStore::new(&self.cache_config)));
        let state = FeedState::new(self.filter, RateLimiter::new(self.rate_limit));

        Ok(FeedManager::from_inner(Inner {
            fetcher,
            cache,
            observers: self.observers,
            viewport: self.viewport,
            request_timeout: self.request_timeout,
            state: Mutex::new(state),
        }))
    }
}

impl Default for FeedManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
