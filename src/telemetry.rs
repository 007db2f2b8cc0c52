//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `vitrine_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `kind`: page kind: "initial" or "more"
//! - `status`: outcome: "ok" or "error"

/// Total page fetches issued to the content endpoint.
///
/// Labels: `kind`, `status` ("ok" | "error").
pub const PAGES_FETCHED_TOTAL: &str = "vitrine_pages_fetched_total";

/// Page fetch duration in seconds.
///
/// Labels: `kind`.
pub const FETCH_DURATION_SECONDS: &str = "vitrine_fetch_duration_seconds";

/// Total feed cache hits.
pub const CACHE_HITS_TOTAL: &str = "vitrine_cache_hits_total";

/// Total feed cache misses.
pub const CACHE_MISSES_TOTAL: &str = "vitrine_cache_misses_total";

/// Fetch results discarded because the view changed while they were in flight.
///
/// Labels: `kind`.
pub const STALE_RESPONSES_TOTAL: &str = "vitrine_stale_responses_total";

/// Total rate-limit cooldowns entered.
pub const COOLDOWNS_TOTAL: &str = "vitrine_cooldowns_total";

/// Initial-load callers that joined an already in-flight load.
pub const SINGLE_FLIGHT_JOINS_TOTAL: &str = "vitrine_single_flight_joins_total";
