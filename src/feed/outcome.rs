//! Feed phases and load outcomes.

use std::sync::Arc;

use crate::VitrineError;
use crate::types::ImageRecord;

/// Lifecycle phase of a feed view.
///
/// `Idle → LoadingInitial → Ready ⇄ LoadingMore`, with any load able to
/// end in `Error`. A filter or tag change resets to `Idle` before the
/// next initial load starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedPhase {
    #[default]
    Idle,
    LoadingInitial,
    Ready,
    LoadingMore,
    Error,
}

impl FeedPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedPhase::LoadingInitial | FeedPhase::LoadingMore)
    }
}

/// Why a pagination request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another load is in flight for this view.
    InFlight,
    /// The rate limiter is cooling down.
    CoolingDown,
    /// The view has no more pages.
    Exhausted,
    /// The view is not loaded (idle, errored or evicted).
    NotReady,
}

/// Result of a load operation, as seen by its caller.
///
/// Failures are already rendered by the time the caller sees them; the
/// outcome exists so hosts and tests can react without observing render
/// instructions.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Images were rendered. For an initial load this is the full view;
    /// for pagination it is only the genuinely new items.
    Loaded {
        images: Vec<ImageRecord>,
        has_more: bool,
        from_cache: bool,
    },
    /// The initial page was empty.
    NoResults,
    /// The view needs a signed-in caller.
    AuthRequired,
    /// The fetch failed; cached state is unchanged.
    Failed(Arc<VitrineError>),
    /// The view changed while the fetch was in flight; the result was
    /// discarded.
    Stale,
    /// Nothing was requested.
    Skipped(SkipReason),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }

    /// Images carried by a `Loaded` outcome; empty otherwise.
    pub fn images(&self) -> &[ImageRecord] {
        match self {
            LoadOutcome::Loaded { images, .. } => images,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&VitrineError> {
        match self {
            LoadOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
