//! Document accessor abstraction.
//!
//! The pipeline treats browser/document automation as an external
//! capability: navigate somewhere, read the current document, click a
//! control, wait for the result to settle. Everything above this trait is
//! written against the capability set, not an implementation, so a real
//! browser driver, the bundled static HTTP accessor, and the test mock are
//! interchangeable.

mod politeness;
mod static_http;

pub use politeness::PoliteAccessor;
pub use static_http::StaticAccessor;

use async_trait::async_trait;
use url::Url;

use crate::error::AccessResult;

/// Minimal document-automation capability set.
///
/// Implementations are consumed mutably and sequentially — the accessor is
/// a scarce, rate-limited external resource and the pipeline never issues
/// concurrent operations against it.
#[async_trait]
pub trait DocumentAccessor: Send {
    /// Load a URL, replacing the current document.
    async fn navigate(&mut self, url: &str) -> AccessResult<()>;

    /// Serialized content of the current document.
    async fn content(&self) -> AccessResult<String>;

    /// Click the `index`-th element matching `selector`.
    async fn click(&mut self, selector: &str, index: usize) -> AccessResult<()>;

    /// Wait until the document has settled after navigation or a click.
    async fn wait_for_idle(&self) -> AccessResult<()>;

    /// URL of the current document, when one is loaded.
    fn current_url(&self) -> Option<String>;

    /// Accessor name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Resolve a possibly-relative href against a base URL.
///
/// Fail-soft: anything unresolvable yields `None`.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    Url::parse(base)
        .ok()?
        .join(href)
        .ok()
        .map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_url("https://portal.example.gov/list?page=2", "/opp/164192"),
            Some("https://portal.example.gov/opp/164192".to_string())
        );
    }

    #[test]
    fn test_absolute_href_passes_through() {
        assert_eq!(
            resolve_url("https://portal.example.gov/", "https://files.example.gov/a.pdf"),
            Some("https://files.example.gov/a.pdf".to_string())
        );
    }

    #[test]
    fn test_unresolvable_is_none() {
        assert_eq!(resolve_url("not a base", "also not"), None);
        assert_eq!(resolve_url("https://example.gov", "   "), None);
    }
}
