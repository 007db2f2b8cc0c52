//! Render instructions emitted to feed observers.
//!
//! The orchestrator never touches presentation. Everything a renderer needs
//! is expressed as a [`RenderInstruction`], delivered in order to each
//! registered [`FeedObserver`](crate::feed::FeedObserver).

use super::ImageRecord;

/// Where a new item goes in the rendered feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// After the existing items (pagination).
    Append,
    /// Before the existing items (freshly created item).
    Prepend,
}

/// A single instruction for the external renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Remove every rendered item; a fresh view follows.
    ClearFeed,
    /// Render one item.
    AddToFeed {
        image: ImageRecord,
        placement: Placement,
    },
    /// Remove a rendered item (deleted elsewhere).
    RemoveFromFeed { id: String },
    /// The view resolved to zero items.
    ShowNoResults,
    /// The view requires a signed-in caller.
    ShowLoginRequired,
    /// A fetch failed; the user may retry via refresh.
    ShowError { message: String },
    /// Toggle the busy indicator (also held through rate-limit cooldowns).
    Loading(bool),
    /// No more pages exist for the active view.
    EndOfFeed,
}

impl RenderInstruction {
    pub(crate) fn append(image: ImageRecord) -> Self {
        RenderInstruction::AddToFeed {
            image,
            placement: Placement::Append,
        }
    }

    pub(crate) fn prepend(image: ImageRecord) -> Self {
        RenderInstruction::AddToFeed {
            image,
            placement: Placement::Prepend,
        }
    }
}
