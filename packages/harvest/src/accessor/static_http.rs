//! Static HTTP document accessor.
//!
//! Suitable for server-rendered portals: each navigation is one GET and
//! the full document arrives in the response. There is no script engine,
//! so `click` records the request and succeeds without mutating the
//! document — on these sources tab panels are already present in the DOM
//! and remain queryable. Dynamic sources plug in their own
//! [`DocumentAccessor`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::accessor::DocumentAccessor;
use crate::error::{AccessError, AccessResult};

/// Browser-like User-Agent; some portals reject the default reqwest one.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct StaticAccessor {
    client: reqwest::Client,
    current: Option<LoadedDocument>,
    clicks_recorded: usize,
}

struct LoadedDocument {
    url: String,
    html: String,
}

impl StaticAccessor {
    /// Create an accessor with browser-like defaults.
    pub fn new() -> AccessResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .expect("static accept header"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.5".parse().expect("static language header"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| AccessError::Transport(Box::new(e)))?;

        Ok(Self {
            client,
            current: None,
            clicks_recorded: 0,
        })
    }

    /// Create with a caller-provided client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            current: None,
            clicks_recorded: 0,
        }
    }

    /// How many click requests were recorded (and no-opped).
    pub fn clicks_recorded(&self) -> usize {
        self.clicks_recorded
    }
}

#[async_trait]
impl DocumentAccessor for StaticAccessor {
    async fn navigate(&mut self, url: &str) -> AccessResult<()> {
        debug!(url = %url, "static accessor navigating");

        if url::Url::parse(url).is_err() {
            return Err(AccessError::InvalidUrl {
                url: url.to_string(),
            });
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "navigation transport failure");
            AccessError::Transport(Box::new(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AccessError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| AccessError::Transport(Box::new(e)))?;

        self.current = Some(LoadedDocument {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn content(&self) -> AccessResult<String> {
        self.current
            .as_ref()
            .map(|doc| doc.html.clone())
            .ok_or(AccessError::NoDocument)
    }

    async fn click(&mut self, selector: &str, index: usize) -> AccessResult<()> {
        // No script engine: the click is recorded so callers can observe
        // it, and the document is left as loaded.
        debug!(selector = %selector, index = index, "static accessor click (no-op)");
        self.clicks_recorded += 1;
        Ok(())
    }

    async fn wait_for_idle(&self) -> AccessResult<()> {
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.current.as_ref().map(|doc| doc.url.clone())
    }

    fn name(&self) -> &str {
        "static-http"
    }
}
