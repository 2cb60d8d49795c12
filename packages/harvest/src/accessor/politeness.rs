//! Politeness wrapper over a document accessor.
//!
//! The accessor is a scarce external resource; this wrapper enforces a
//! request quota across navigations and clicks so a collection run cannot
//! hammer a portal no matter how the controller is configured.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;

use crate::accessor::DocumentAccessor;
use crate::error::AccessResult;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Accessor wrapper that waits for a rate-limit permit before every
/// request-issuing operation.
pub struct PoliteAccessor<A: DocumentAccessor> {
    inner: A,
    limiter: Arc<DefaultRateLimiter>,
}

impl<A: DocumentAccessor> PoliteAccessor<A> {
    /// Wrap an accessor with a sustained requests-per-second limit.
    /// A limit of zero is treated as one request per second.
    pub fn new(accessor: A, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self {
            inner: accessor,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// Wrap with the default portal-friendly quota of two requests per
    /// second.
    pub fn with_default_quota(accessor: A) -> Self {
        Self::with_quota(accessor, Quota::per_second(nonzero!(2u32)))
    }

    /// Wrap with a custom quota.
    pub fn with_quota(accessor: A, quota: Quota) -> Self {
        Self {
            inner: accessor,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    async fn wait_for_permit(&self) {
        self.limiter.until_ready().await;
    }
}

#[async_trait]
impl<A: DocumentAccessor + Sync> DocumentAccessor for PoliteAccessor<A> {
    async fn navigate(&mut self, url: &str) -> AccessResult<()> {
        self.wait_for_permit().await;
        self.inner.navigate(url).await
    }

    async fn content(&self) -> AccessResult<String> {
        // Reading the already-loaded document issues no request
        self.inner.content().await
    }

    async fn click(&mut self, selector: &str, index: usize) -> AccessResult<()> {
        self.wait_for_permit().await;
        self.inner.click(selector, index).await
    }

    async fn wait_for_idle(&self) -> AccessResult<()> {
        self.inner.wait_for_idle().await
    }

    fn current_url(&self) -> Option<String> {
        self.inner.current_url()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
