//! Active filter selection and request authentication.
//!
//! [`FilterState`] is the single source of truth for which view is showing:
//! the visibility filter, the active tag set, and the caller's credentials.
//! The orchestrator resolves cache keys and request credentials through it.

use std::fmt;

use crate::types::{CacheKey, TagSet, Visibility};
use crate::{Result, VitrineError};

/// Bearer token identifying the signed-in caller.
///
/// `Debug` output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Currently selected visibility filter, tag set and credentials.
///
/// Selecting [`Visibility::Private`] without credentials is allowed; the
/// state is then [invalid](Self::is_valid) and loads short-circuit to an
/// auth-required outcome instead of fetching.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    visibility: Visibility,
    tags: TagSet,
    token: Option<AccessToken>,
}

impl FilterState {
    /// Public, untagged, anonymous.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the current selection can be fetched with the current
    /// credentials.
    pub fn is_valid(&self) -> bool {
        !self.visibility.requires_auth() || self.is_authenticated()
    }

    /// Cache key of the active view.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.visibility, self.tags.clone())
    }

    /// Select a visibility filter. Returns whether it changed.
    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        let changed = self.visibility != visibility;
        self.visibility = visibility;
        changed
    }

    /// Replace the active tag set. Returns whether it changed.
    pub fn set_tags(&mut self, tags: TagSet) -> bool {
        let changed = self.tags != tags;
        self.tags = tags;
        changed
    }

    pub fn set_access_token(&mut self, token: Option<AccessToken>) {
        self.token = token;
    }

    /// Credentials to attach to a request for `visibility`.
    ///
    /// The token is sent whenever one is present; scopes that require it
    /// fail with [`VitrineError::AuthRequired`] when it is missing.
    pub fn credentials_for(&self, visibility: Visibility) -> Result<Option<AccessToken>> {
        match &self.token {
            Some(token) => Ok(Some(token.clone())),
            None if visibility.requires_auth() => Err(VitrineError::AuthRequired),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_public_anonymous() {
        let state = FilterState::new();
        assert_eq!(state.visibility(), Visibility::Public);
        assert!(state.tags().is_empty());
        assert!(!state.is_authenticated());
        assert!(state.is_valid());
    }

    #[test]
    fn private_without_token_is_invalid() {
        let state = FilterState::new().with_visibility(Visibility::Private);
        assert!(!state.is_valid());
        assert!(matches!(
            state.credentials_for(Visibility::Private),
            Err(VitrineError::AuthRequired)
        ));
    }

    #[test]
    fn token_is_sent_for_any_scope() {
        let state = FilterState::new().with_token(AccessToken::new("t0k"));
        let creds = state.credentials_for(Visibility::Public).unwrap();
        assert_eq!(creds.unwrap().expose(), "t0k");
        assert!(state.credentials_for(Visibility::Private).unwrap().is_some());
    }

    #[test]
    fn setters_report_change() {
        let mut state = FilterState::new();
        assert!(!state.set_visibility(Visibility::Public));
        assert!(state.set_visibility(Visibility::Private));
        assert!(state.set_tags(TagSet::new(["a"])));
        assert!(!state.set_tags(TagSet::new(["A"])));
    }

    #[test]
    fn cache_key_tracks_selection() {
        let state = FilterState::new()
            .with_visibility(Visibility::Private)
            .with_tags(TagSet::new(["b", "a"]));
        assert_eq!(
            state.cache_key(),
            CacheKey::new(Visibility::Private, TagSet::new(["a", "b"]))
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
