//! Observer interfaces between the orchestrator and its host.

use crate::types::RenderInstruction;

/// Receives render instructions from a [`FeedManager`](super::FeedManager).
///
/// Observers are called synchronously, in registration order, once per
/// instruction. The manager never holds internal locks while delivering,
/// so an observer may call back into the manager's accessors.
pub trait FeedObserver: Send + Sync {
    fn render(&self, instruction: &RenderInstruction);
}

impl<F> FeedObserver for F
where
    F: Fn(&RenderInstruction) + Send + Sync,
{
    fn render(&self, instruction: &RenderInstruction) {
        self(instruction)
    }
}

/// Reports whether the viewport is still near the end of the feed.
///
/// Consulted when a rate-limit cooldown ends and a scroll trigger was
/// refused during it: the deferred load only runs if the probe still
/// reports "near end".
pub trait ViewportProbe: Send + Sync {
    fn is_near_end(&self) -> bool;
}

impl<F> ViewportProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_near_end(&self) -> bool {
        self()
    }
}
