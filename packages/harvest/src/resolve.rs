//! Ordered-fallback field resolution.
//!
//! Every field an extractor pulls out of a document is described as a
//! priority list of acquisition strategies. The resolver evaluates them
//! strictly in order and returns the first non-empty result; a strategy
//! that cannot run degrades to `None` rather than raising, so a single bad
//! selector never aborts extraction of the rest of the record.
//!
//! The fallback order is a plain data structure ([`FieldPlan`]), which
//! makes it serializable per source and testable without a live document.

use serde::{Deserialize, Serialize};

use crate::dom::Document;
use crate::extract::{labeled, tabular};

/// Evaluate strategies in order; first non-empty result wins.
///
/// `resolve([])` is `None`. Whitespace-only results are treated as misses.
pub fn resolve<I, F>(strategies: I) -> Option<String>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Option<String>,
{
    strategies.into_iter().find_map(|strategy| {
        strategy()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// One acquisition method for a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldStrategy {
    /// Read an attribute off the first element a selector matches
    Attr { selector: String, attr: String },

    /// Read the text of the first element a selector matches
    Text { selector: String },

    /// Try each selector in order, first non-empty text wins
    AnyText { selectors: Vec<String> },

    /// Label→adjacent-value lookup across table, definition-list, and
    /// free-text layouts
    Labeled { labels: Vec<String> },

    /// Value lookup by header across decoded tables
    TableLookup { keys: Vec<String> },
}

impl FieldStrategy {
    /// Run this strategy against a snapshot. Always fail-soft.
    pub fn run(&self, doc: &Document) -> Option<String> {
        match self {
            Self::Attr { selector, attr } => doc.first_attr(selector, attr),
            Self::Text { selector } => doc.first_text(selector),
            Self::AnyText { selectors } => {
                selectors.iter().find_map(|selector| doc.first_text(selector))
            }
            Self::Labeled { labels } => {
                let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
                labeled::labeled_value(doc, &refs)
            }
            Self::TableLookup { keys } => {
                let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
                tabular::lookup(doc, &refs)
            }
        }
    }
}

/// An ordered fallback chain for one field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldPlan {
    pub strategies: Vec<FieldStrategy>,
}

impl FieldPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute-read strategy.
    pub fn attr(mut self, selector: impl Into<String>, attr: impl Into<String>) -> Self {
        self.strategies.push(FieldStrategy::Attr {
            selector: selector.into(),
            attr: attr.into(),
        });
        self
    }

    /// Append a selector-text strategy.
    pub fn text(mut self, selector: impl Into<String>) -> Self {
        self.strategies.push(FieldStrategy::Text {
            selector: selector.into(),
        });
        self
    }

    /// Append a first-hit-wins selector list strategy.
    pub fn any_text(mut self, selectors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strategies.push(FieldStrategy::AnyText {
            selectors: selectors.into_iter().map(|s| s.into()).collect(),
        });
        self
    }

    /// Append a label-match strategy.
    pub fn labeled(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strategies.push(FieldStrategy::Labeled {
            labels: labels.into_iter().map(|l| l.into()).collect(),
        });
        self
    }

    /// Append a tabular-lookup strategy.
    pub fn table(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.strategies.push(FieldStrategy::TableLookup {
            keys: keys.into_iter().map(|k| k.into()).collect(),
        });
        self
    }

    /// Resolve this plan against a snapshot: strategies in order, first
    /// non-empty wins, `None` when the whole chain misses.
    pub fn resolve(&self, doc: &Document) -> Option<String> {
        resolve(self.strategies.iter().map(|s| move || s.run(doc)))
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
