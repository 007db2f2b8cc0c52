//! Session-based pagination throttle.
//!
//! Every successful "load more" counts against the current browsing session.
//! Each time the count reaches a multiple of
//! [`RateLimitConfig::pages_per_window`], the limiter enters a cooldown during
//! which further pagination is refused. Switching the visibility filter starts
//! a fresh session (see [`RateLimiter::reset`]).
//!
//! Time is read from `tokio::time::Instant`, so cooldowns follow tokio's
//! clock (and can be driven by `tokio::time::pause()` in tests).

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Configuration for pagination throttling.
///
/// ```rust
/// # use vitrine::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .pages_per_window(4)
///     .cooldown(Duration::from_secs(5));
/// assert_eq!(config.cooldown_duration(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Pages loaded before a cooldown kicks in. 0 disables throttling.
    /// Default: 6.
    #[serde(default = "default_pages_per_window")]
    pub pages_per_window: u32,
    /// Cooldown length in milliseconds. Default: 3000.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            pages_per_window: default_pages_per_window(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that never throttles.
    pub fn disabled() -> Self {
        Self {
            pages_per_window: 0,
            ..Self::default()
        }
    }

    /// Set the number of pages per window.
    pub fn pages_per_window(mut self, n: u32) -> Self {
        self.pages_per_window = n;
        self
    }

    /// Set the cooldown length.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    /// Cooldown length as a `Duration`.
    pub fn cooldown_duration(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

fn default_pages_per_window() -> u32 {
    6
}

fn default_cooldown_ms() -> u64 {
    3_000
}

/// Per-session page counter with periodic cooldowns.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    pages_loaded: u32,
    cooldown_until: Option<Instant>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            pages_loaded: 0,
            cooldown_until: None,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Pages loaded since the session started.
    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown_remaining().is_some()
    }

    /// Time left in the current cooldown, if one is active.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let until = self.cooldown_until?;
        let now = Instant::now();
        (now < until).then(|| until - now)
    }

    /// Count one successfully loaded page.
    ///
    /// Returns the cooldown length if this page completed a window.
    pub fn record_page(&mut self) -> Option<Duration> {
        self.pages_loaded += 1;
        let window = self.config.pages_per_window;
        if window == 0 || self.pages_loaded % window != 0 {
            return None;
        }
        let cooldown = self.config.cooldown_duration();
        self.cooldown_until = Some(Instant::now() + cooldown);
        Some(cooldown)
    }

    /// Start a fresh session: zero the counter and clear any cooldown.
    pub fn reset(&mut self) {
        self.pages_loaded = 0;
        self.cooldown_until = None;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
