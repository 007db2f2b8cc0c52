//! Response-shape normalization for the feed endpoint.
//!
//! The endpoint reports "more pages available" in one of three places:
//!
//! 1. top-level `hasMore`
//! 2. `data.hasMore`
//! 3. `pagination.hasMore`
//!
//! [`resolve_has_more`] checks them in exactly that order. When none is
//! present the answer is a policy default: optimistic (`true`) for page 0,
//! conservative (`false`) for later pages so an ambiguous response can never
//! drive infinite scroll in a loop.
//!
//! Image lists are read from top-level `images`, then `data.images`, then a
//! bare top-level array. A body with no usable list is treated as an empty,
//! terminal page.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{Result, VitrineError};
use crate::types::{FeedPage, ImageRecord};

/// Field carrying the "more pages" signal at every nesting level.
const HAS_MORE_FIELD: &str = "hasMore";

/// Containers that may nest the signal, in priority order after top level.
const NESTED_CONTAINERS: [&str; 2] = ["data", "pagination"];

/// Resolve the "more pages available" signal of a response body.
///
/// Priority: `hasMore` → `data.hasMore` → `pagination.hasMore` → default
/// (`page == 0`). A field that is present but not a boolean is skipped.
///
/// ```rust
/// # use vitrine::fetcher::normalize::resolve_has_more;
/// # use serde_json::json;
/// let body = json!({ "hasMore": false, "data": { "hasMore": true } });
/// assert!(!resolve_has_more(&body, 3));
///
/// let body = json!({ "pagination": { "hasMore": true } });
/// assert!(resolve_has_more(&body, 3));
///
/// assert!(resolve_has_more(&json!({}), 0));
/// assert!(!resolve_has_more(&json!({}), 1));
/// ```
pub fn resolve_has_more(body: &Value, page: u32) -> bool {
    std::iter::once(body.get(HAS_MORE_FIELD))
        .chain(
            NESTED_CONTAINERS
                .iter()
                .map(|container| body.get(container).and_then(|c| c.get(HAS_MORE_FIELD))),
        )
        .flatten()
        .find_map(Value::as_bool)
        .unwrap_or(page == 0)
}

/// Locate the image list in a response body, if it has one.
fn image_list(body: &Value) -> Option<&Vec<Value>> {
    body.get("images")
        .and_then(Value::as_array)
        .or_else(|| body.get("data")?.get("images")?.as_array())
        .or_else(|| body.as_array())
}

/// Extract image records, skipping entries that cannot be used.
///
/// Returns `None` when the body has no image list at all.
pub fn extract_images(body: &Value) -> Option<Vec<ImageRecord>> {
    let list = image_list(body)?;
    let images = list
        .iter()
        .filter_map(|item| match RawImage::deserialize(item) {
            Ok(raw) => raw.into_record(),
            Err(e) => {
                debug!(error = %e, "skipping unusable image entry");
                None
            }
        })
        .collect();
    Some(images)
}

/// Normalize a decoded response body into a [`FeedPage`].
///
/// A body without an image list, or with an empty one, yields an empty page
/// with `has_more == false`.
pub fn normalize_page(body: &Value, page: u32) -> FeedPage {
    let Some(images) = extract_images(body) else {
        warn!(page, "response has no image list; treating as empty");
        return FeedPage::empty();
    };
    if images.is_empty() {
        return FeedPage::empty();
    }
    let has_more = resolve_has_more(body, page);
    FeedPage::new(images, has_more)
}

/// Decode and normalize a raw response body.
///
/// Fails on non-JSON bodies and on JSON scalars, which no endpoint version
/// ever sends for a feed page.
pub fn parse_page(body: &str, page: u32) -> Result<FeedPage> {
    let value: Value = serde_json::from_str(body)?;
    if !value.is_object() && !value.is_array() {
        return Err(VitrineError::MalformedResponse(format!(
            "expected an object or array, got {value}"
        )));
    }
    Ok(normalize_page(&value, page))
}

/// Identifiers arrive as strings or numbers depending on the backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Lenient wire shape of an image entry.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    id: RawId,
    #[serde(alias = "imageUrl", alias = "image_url")]
    url: String,
    #[serde(default, alias = "promptText")]
    prompt: Option<String>,
    #[serde(default, alias = "is_public")]
    is_public: Option<bool>,
    #[serde(default, alias = "userId", alias = "user_id", alias = "owner_id")]
    owner_id: Option<RawId>,
    #[serde(default, alias = "created_at")]
    created_at: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl RawImage {
    fn into_record(self) -> Option<ImageRecord> {
        let id = self.id.into_string();
        if id.is_empty() || self.url.is_empty() {
            return None;
        }
        Some(ImageRecord {
            id,
            url: self.url,
            prompt: self.prompt.unwrap_or_default(),
            is_public: self.is_public.unwrap_or(false),
            owner_id: self.owner_id.map(RawId::into_string),
            created_at: self.created_at,
            tags: self.tags.unwrap_or_default().into_iter().collect(),
        })
    }
}
