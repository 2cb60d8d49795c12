//! Testing utilities including a scriptable document accessor.
//!
//! Useful for exercising extraction and collection logic without a
//! network or a browser.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::accessor::DocumentAccessor;
use crate::error::{AccessError, AccessResult};

/// Record of a call made to the mock accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Navigate { url: String },
    Content,
    Click { selector: String, index: usize },
    WaitForIdle,
}

/// A scriptable in-memory document accessor.
///
/// Pages are registered by URL. Clicks can be scripted to fail (to
/// exercise tab-skip behavior) or to swap the current document (to
/// emulate tab activation on a dynamic source).
#[derive(Default)]
pub struct MockAccessor {
    pages: HashMap<String, String>,
    click_failures: HashSet<(String, usize)>,
    click_content: HashMap<(String, usize), String>,
    current: Option<(String, String)>,
    calls: Vec<MockCall>,
}

impl MockAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page the accessor can navigate to.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Script a click target to fail.
    pub fn failing_click(mut self, selector: impl Into<String>, index: usize) -> Self {
        self.click_failures.insert((selector.into(), index));
        self
    }

    /// Script a click target to replace the current document.
    pub fn click_swaps_content(
        mut self,
        selector: impl Into<String>,
        index: usize,
        html: impl Into<String>,
    ) -> Self {
        self.click_content
            .insert((selector.into(), index), html.into());
        self
    }

    /// All calls made against this accessor, in order.
    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    /// Number of click calls that were attempted.
    pub fn click_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MockCall::Click { .. }))
            .count()
    }

    /// Number of navigations that were attempted.
    pub fn navigation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, MockCall::Navigate { .. }))
            .count()
    }
}

#[async_trait]
impl DocumentAccessor for MockAccessor {
    async fn navigate(&mut self, url: &str) -> AccessResult<()> {
        self.calls.push(MockCall::Navigate {
            url: url.to_string(),
        });
        match self.pages.get(url) {
            Some(html) => {
                self.current = Some((url.to_string(), html.clone()));
                Ok(())
            }
            None => Err(AccessError::Navigation {
                url: url.to_string(),
                reason: "no page registered".to_string(),
            }),
        }
    }

    async fn content(&self) -> AccessResult<String> {
        // Content reads are not recorded mutably; the call log tracks
        // request-issuing operations
        self.current
            .as_ref()
            .map(|(_, html)| html.clone())
            .ok_or(AccessError::NoDocument)
    }

    async fn click(&mut self, selector: &str, index: usize) -> AccessResult<()> {
        self.calls.push(MockCall::Click {
            selector: selector.to_string(),
            index,
        });

        let key = (selector.to_string(), index);
        if self.click_failures.contains(&key) {
            return Err(AccessError::Click {
                target: format!("{selector}[{index}]"),
            });
        }
        if let Some(html) = self.click_content.get(&key) {
            if let Some((url, _)) = self.current.take() {
                self.current = Some((url, html.clone()));
            }
        }
        Ok(())
    }

    async fn wait_for_idle(&self) -> AccessResult<()> {
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.current.as_ref().map(|(url, _)| url.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
