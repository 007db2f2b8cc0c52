//! Image records carried through the feed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single gallery item.
///
/// `id` is unique; a feed never holds two records with the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub url: String,
    /// Prompt text the image was generated from.
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Creation timestamp as reported by the backend (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl ImageRecord {
    /// Create a record with required fields; everything else defaults.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            prompt: String::new(),
            is_public: false,
            owner_id: None,
            created_at: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}
