//! Tabbed-content harvesting.
//!
//! Detail pages hide half their fields behind UI tabs. This extractor
//! enumerates tab controls, determines a name for each (rendered text,
//! then `name` attribute, then `aria-label`, then element id), activates
//! inactive tabs through the accessor, waits for the content to settle,
//! and harvests each tab's visible content with the same table/text
//! strategies used everywhere else.
//!
//! Tabs that cannot be named or activated are skipped — they are simply
//! absent from the result map, never present as null placeholders.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::accessor::DocumentAccessor;
use crate::dom::{self, Document};
use crate::error::AccessResult;
use crate::extract::tabular;

/// Selectors describing a source's tab markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabConfig {
    /// Tab control elements
    pub control: String,

    /// Tab panel elements, in control order
    pub panel: String,

    /// Class marking an already-active control
    pub active_class: String,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            control: "[role='tab'], ul.nav-tabs a, .tabs .tab".to_string(),
            panel: "[role='tabpanel'], .tab-pane".to_string(),
            active_class: "active".to_string(),
        }
    }
}

/// What we learned about one tab control before activating it.
struct TabInfo {
    name: Option<String>,
    active: bool,
    /// Panel id from `aria-controls`, when the markup provides one
    panel_id: Option<String>,
}

/// Harvest all tab content from the currently loaded document.
///
/// The error case covers only the initial snapshot — per-tab failures
/// (unnameable tab, failed click, unreadable panel) degrade to omission.
pub async fn harvest_tabs<A>(
    accessor: &mut A,
    config: &TabConfig,
) -> AccessResult<IndexMap<String, String>>
where
    A: DocumentAccessor + ?Sized,
{
    let html = accessor.content().await?;
    let tabs = {
        let doc = Document::parse(&html);
        enumerate_tabs(&doc, config)
    };

    let mut harvested: IndexMap<String, String> = IndexMap::new();

    for (index, tab) in tabs.iter().enumerate() {
        let Some(name) = tab.name.as_deref() else {
            debug!(index = index, "skipping unnameable tab");
            continue;
        };

        if !tab.active {
            if let Err(e) = accessor.click(&config.control, index).await {
                warn!(tab = %name, error = %e, "tab activation failed, skipping");
                continue;
            }
            if let Err(e) = accessor.wait_for_idle().await {
                warn!(tab = %name, error = %e, "tab did not settle, skipping");
                continue;
            }
        }

        let Ok(current) = accessor.content().await else {
            warn!(tab = %name, "could not read document after activation, skipping");
            continue;
        };

        let content = {
            let doc = Document::parse(&current);
            panel_content(&doc, config, index, tab.panel_id.as_deref())
        };

        if let Some(content) = content {
            harvested.insert(name.to_string(), content);
        }
    }

    Ok(harvested)
}

fn attr_value(el: scraper::ElementRef<'_>, attr: &str) -> Option<String> {
    el.value()
        .attr(attr)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Enumerate tab controls in the current snapshot.
fn enumerate_tabs(doc: &Document, config: &TabConfig) -> Vec<TabInfo> {
    doc.select_all(&config.control)
        .into_iter()
        .map(|el| {
            // Name priority: rendered text, name attribute, accessible
            // label, element id
            let name = Some(dom::element_text(el))
                .filter(|t| !t.is_empty())
                .or_else(|| attr_value(el, "name"))
                .or_else(|| attr_value(el, "aria-label"))
                .or_else(|| attr_value(el, "id"));

            let active = el
                .value()
                .attr("class")
                .map(|c| c.split_whitespace().any(|cls| cls == config.active_class))
                .unwrap_or(false)
                || el.value().attr("aria-selected") == Some("true");

            let panel_id = el
                .value()
                .attr("aria-controls")
                .map(str::to_string)
                .filter(|id| !id.is_empty());

            TabInfo {
                name,
                active,
                panel_id,
            }
        })
        .collect()
}

/// Extract one tab's visible content as a string.
///
/// The panel is located by `aria-controls` id when present, else by
/// position among panel elements. Tables inside the panel are decoded and
/// rendered as `header: value` lines; panels without tables yield their
/// collapsed text.
fn panel_content(
    doc: &Document,
    config: &TabConfig,
    index: usize,
    panel_id: Option<&str>,
) -> Option<String> {
    let panel = match panel_id {
        Some(id) => doc.select_first(&format!("#{id}")),
        None => doc.select_all(&config.panel).into_iter().nth(index),
    }?;

    let tables = tabular::decode_tables_in(panel);
    let mut lines: Vec<String> = Vec::new();
    for table in &tables {
        for row in &table.rows {
            for (header, value) in row {
                if !value.trim().is_empty() {
                    lines.push(format!("{header}: {value}"));
                }
            }
        }
    }

    let content = if lines.is_empty() {
        dom::element_text(panel)
    } else {
        lines.join("\n")
    };

    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}
