//! Visibility filter and tag set types.
//!
//! These are the two dimensions of a feed view. Both are value types:
//! a [`TagSet`] is always held in its canonical (normalized, sorted) form,
//! so equality and hashing are set semantics regardless of input order.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::VitrineError;

/// Visibility scope of a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Site-wide public content.
    #[default]
    Public,
    /// The caller's own content, including private items.
    Private,
}

impl Visibility {
    /// Wire name used in the `filter` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// Whether requests for this scope need an authenticated caller.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" | "site" => Ok(Visibility::Public),
            "private" | "mine" | "user" => Ok(Visibility::Private),
            other => Err(VitrineError::InvalidInput(format!(
                "unknown visibility filter '{other}'"
            ))),
        }
    }
}

/// Normalized set of tags restricting a feed view.
///
/// Tags are trimmed and lower-cased; empty tags are dropped and duplicates
/// collapse. Iteration order is sorted, which is the canonical storage form.
///
/// ```rust
/// # use vitrine::TagSet;
/// let a = TagSet::new(["Cats", " dogs "]);
/// let b = TagSet::new(["dogs", "cats", "CATS"]);
/// assert_eq!(a, b);
/// assert_eq!(a.to_query(), "cats,dogs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Build a tag set from raw labels, normalizing each one.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(tags.into_iter().filter_map(|t| normalize_tag(t.as_ref())).collect())
    }

    /// The empty tag set (no tag restriction).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"cats, dogs"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|t| self.0.contains(&t))
    }

    /// Tags in canonical (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined canonical form, as sent in the `tags` query parameter.
    pub fn to_query(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_query())
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}
