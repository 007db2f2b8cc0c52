//! HTTP client for the remote feed endpoint.
//!
//! `GET <endpoint>?filter={public|private}&page=<n>&tags=<a,b>` with an
//! optional bearer token. The JSON body is normalized by
//! [`normalize::parse_page`](super::normalize::parse_page).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ContentFetcher, PageRequest, normalize};
use crate::types::FeedPage;
use crate::{Result, VitrineError};

/// Default transport-level timeout. The orchestrator applies its own
/// (usually shorter) deadline on top of this.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// [`ContentFetcher`] backed by `reqwest`.
#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    endpoint: String,
}

impl HttpFetcher {
    /// Create a fetcher for the given feed endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .user_agent(concat!("vitrine/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VitrineError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters for `request`; `tags` is omitted when empty.
    fn query(request: &PageRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("filter", request.visibility.as_str().to_string()),
            ("page", request.page.to_string()),
        ];
        if !request.tags.is_empty() {
            query.push(("tags", request.tags.to_query()));
        }
        query
    }

    /// Check response status and map to the error taxonomy.
    fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 | 403 => Err(VitrineError::AuthRequired),
            code => Err(VitrineError::Api {
                status: code,
                message: format!("feed endpoint error: {status}"),
            }),
        }
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage> {
        let mut builder = self.http.get(&self.endpoint).query(&Self::query(request));
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token.expose());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| VitrineError::Http(e.to_string()))?;

        Self::handle_response_errors(&response)?;

        let body = response
            .text()
            .await
            .map_err(|e| VitrineError::Http(e.to_string()))?;

        let page = normalize::parse_page(&body, request.page)?;
        debug!(
            visibility = %request.visibility,
            page = request.page,
            images = page.images.len(),
            has_more = page.has_more,
            "fetched feed page"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TagSet, Visibility};

    fn request(tags: &[&str]) -> PageRequest {
        PageRequest {
            visibility: Visibility::Private,
            page: 3,
            tags: TagSet::new(tags),
            token: None,
        }
    }

    #[test]
    fn query_omits_empty_tags() {
        let query = HttpFetcher::query(&request(&[]));
        assert_eq!(
            query,
            vec![("filter", "private".to_string()), ("page", "3".to_string())]
        );
    }

    #[test]
    fn query_joins_canonical_tags() {
        let query = HttpFetcher::query(&request(&["dogs", "Cats"]));
        assert_eq!(query[2], ("tags", "cats,dogs".to_string()));
    }
}
