//! Pagination and admission control over a listing source.
//!
//! The controller walks listing pages in order, applies the date-window
//! admission test to every row, visits admitted detail pages one at a
//! time with politeness delays, and persists one immutable batch per
//! page. Item-level failures are logged and skipped; only accessor
//! failure on the first page and storage failures abort the run.
//!
//! For sources guaranteed to list items in descending date order, the
//! first item dated strictly before the window start sets a stop flag and
//! no further items on that page are processed. That shortcut is only
//! valid under the ordering guarantee and is gated behind
//! `SourceConfig::ordered_by_date_desc`; pagination always terminates
//! naturally when a page comes back short.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::accessor::{resolve_url, DocumentAccessor};
use crate::collect::session::Session;
use crate::config::SourceConfig;
use crate::dates::parse_flexible;
use crate::dom::{self, Document};
use crate::download::{fetch_with_retry, Downloader, RetryPolicy};
use crate::error::{HarvestError, Result};
use crate::extract::record::RecordExtractor;
use crate::extract::tabs::harvest_tabs;
use crate::store::BatchStore;
use crate::types::{Batch, BatchItem, BatchMetadata, ListingEntry};

/// Summary of one collection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectReport {
    pub session_id: String,
    pub pages_fetched: u32,
    pub items_seen: usize,
    pub items_admitted: usize,
    pub items_skipped_window: usize,
    pub items_skipped_undated: usize,
    pub items_failed: usize,
    pub batches_written: u32,
    pub documents_downloaded: usize,
    pub documents_missing: usize,
    pub stopped_early: bool,
}

impl CollectReport {
    /// Whether every admitted item made it into a batch.
    pub fn is_clean(&self) -> bool {
        self.items_failed == 0
    }
}

/// Drives one collection session against one source.
pub struct CollectionController<A: DocumentAccessor> {
    accessor: A,
    extractor: RecordExtractor,
    store: BatchStore,
    session: Session,
    downloader: Option<Box<dyn Downloader>>,
}

impl<A: DocumentAccessor> CollectionController<A> {
    pub fn new(accessor: A, config: SourceConfig, session: Session, store: BatchStore) -> Self {
        Self {
            accessor,
            extractor: RecordExtractor::new(config),
            store,
            session,
            downloader: None,
        }
    }

    /// Attach a downloader for attachment fetching. Without one,
    /// attachments are recorded but not downloaded even when the config
    /// asks for downloads.
    pub fn with_downloader(mut self, downloader: Box<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    fn config(&self) -> &SourceConfig {
        self.extractor.config()
    }

    /// Run the session to completion.
    pub async fn run(mut self) -> Result<CollectReport> {
        let mut report = CollectReport {
            session_id: self.session.id.clone(),
            ..Default::default()
        };

        info!(
            source = %self.config().name,
            session = %self.session.id,
            window_from = %self.session.window.from,
            window_to = %self.session.window.to,
            "collection starting"
        );

        let mut page: u32 = 1;
        loop {
            let page_url = self.config().listing_page_url(page);

            let html = match self.fetch_page(&page_url).await {
                Ok(html) => html,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    // Later listing pages failing ends the walk with what
                    // we have rather than losing the whole run
                    warn!(page = page, error = %e, "listing page failed, ending pagination");
                    break;
                }
            };
            report.pages_fetched += 1;

            let entries = {
                let doc = Document::parse(&html);
                self.parse_listing(&doc, &page_url, page)
            };
            if entries.is_empty() {
                info!(page = page, "no entries on page, ending pagination");
                break;
            }
            let page_entry_count = entries.len();
            report.items_seen += page_entry_count;

            let (admitted, stop) = self.admit(entries, &mut report);
            report.items_admitted += admitted.len();

            let mut items: Vec<BatchItem> = Vec::with_capacity(admitted.len());
            for entry in admitted {
                self.pause(self.config().item_delay_ms).await;

                match self.visit_detail(&entry, &mut report).await {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        warn!(
                            detail_url = %entry.detail_link,
                            error = %e,
                            "detail page failed, skipping item"
                        );
                        report.items_failed += 1;
                    }
                }
            }

            if !items.is_empty() {
                let batch = Batch::new(
                    BatchMetadata {
                        scraped_at: Utc::now(),
                        source: self.config().name.clone(),
                        source_url: page_url.clone(),
                        date_range: self.session.window,
                        session_id: self.session.id.clone(),
                        batch_number: report.batches_written + 1,
                        total_items: items.len(),
                    },
                    items,
                );
                self.store.write_batch(&batch).map_err(HarvestError::from)?;
                report.batches_written += 1;
            }

            if stop {
                report.stopped_early = true;
                info!(page = page, "date window exhausted, stopping");
                break;
            }
            if page_entry_count < self.config().page_size {
                info!(page = page, count = page_entry_count, "short page, ending pagination");
                break;
            }
            if !self.config().is_paginated() {
                break;
            }

            page += 1;
            self.pause(self.config().page_delay_ms).await;
        }

        info!(
            session = %report.session_id,
            pages = report.pages_fetched,
            admitted = report.items_admitted,
            failed = report.items_failed,
            batches = report.batches_written,
            "collection finished"
        );
        Ok(report)
    }

    async fn fetch_page(&mut self, url: &str) -> Result<String> {
        self.accessor.navigate(url).await.map_err(HarvestError::from)?;
        self.accessor.wait_for_idle().await.map_err(HarvestError::from)?;
        let html = self.accessor.content().await.map_err(HarvestError::from)?;
        Ok(html)
    }

    /// Decode one listing page into entries.
    fn parse_listing(&self, doc: &Document, page_url: &str, page: u32) -> Vec<ListingEntry> {
        let selectors = &self.config().listing;
        let mut entries = Vec::new();

        for (ordinal, row) in doc.select_all(&selectors.row).into_iter().enumerate() {
            let Some(link) = dom::first_within(row, &selectors.link) else {
                continue;
            };
            let Some(detail_link) = link
                .value()
                .attr("href")
                .and_then(|href| resolve_url(page_url, href))
            else {
                continue;
            };

            let title = selectors
                .title
                .as_deref()
                .and_then(|sel| dom::first_within(row, sel))
                .map(dom::element_text)
                .filter(|t| !t.is_empty())
                .or_else(|| Some(dom::element_text(link)).filter(|t| !t.is_empty()));

            let listed_date = selectors
                .date
                .as_deref()
                .and_then(|sel| dom::first_within(row, sel))
                .map(dom::element_text)
                .filter(|t| !t.is_empty());

            let external_id = selectors
                .id_attr_selector
                .as_deref()
                .zip(selectors.id_attr.as_deref())
                .and_then(|(sel, attr)| {
                    dom::first_within(row, sel).and_then(|el| {
                        el.value().attr(attr).map(|v| v.trim().to_string())
                    })
                })
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    selectors.id_text.as_deref().and_then(|sel| {
                        dom::first_within(row, sel)
                            .map(dom::element_text)
                            .filter(|t| !t.is_empty())
                    })
                });

            entries.push(ListingEntry {
                external_id,
                title,
                detail_link,
                listed_date,
                page_number: page,
                ordinal,
            });
        }

        entries
    }

    /// Date-window admission. Returns the admitted entries and whether
    /// the descending-order stop fired.
    fn admit(
        &self,
        entries: Vec<ListingEntry>,
        report: &mut CollectReport,
    ) -> (Vec<ListingEntry>, bool) {
        let window = self.session.window;
        let ordered = self.config().ordered_by_date_desc;

        let mut admitted = Vec::new();
        for entry in entries {
            let Some(date) = entry.listed_date.as_deref().and_then(parse_flexible) else {
                // Unparseable dates are excluded but never decide stopping
                report.items_skipped_undated += 1;
                continue;
            };

            if ordered && window.is_before(date) {
                // Listing is descending: everything after this is older
                return (admitted, true);
            }
            if window.contains(date) {
                admitted.push(entry);
            } else {
                report.items_skipped_window += 1;
            }
        }
        (admitted, false)
    }

    /// Visit one detail page and assemble its batch item.
    async fn visit_detail(
        &mut self,
        entry: &ListingEntry,
        report: &mut CollectReport,
    ) -> Result<BatchItem> {
        self.accessor.navigate(&entry.detail_link).await.map_err(HarvestError::from)?;
        self.accessor.wait_for_idle().await.map_err(HarvestError::from)?;
        let html = self.accessor.content().await.map_err(HarvestError::from)?;

        let (mut opportunity, mut documents) = {
            let doc = Document::parse(&html);
            let opp = self.extractor.extract_opportunity(&doc, entry);
            let docs = self
                .extractor
                .extract_documents(&doc, &opp.id, &entry.detail_link);
            (opp, docs)
        };

        if self.config().harvest_tabs {
            let tab_config = self.config().tabs.clone();
            match harvest_tabs(&mut self.accessor, &tab_config).await {
                Ok(tabs) if !tabs.is_empty() => {
                    self.extractor.fill_from_tabs(&mut opportunity, &tabs);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(detail_url = %entry.detail_link, error = %e, "tab harvest failed");
                }
            }
        }

        if self.config().download_attachments {
            self.download_documents(&mut documents, report).await;
        }

        Ok(BatchItem {
            opportunity,
            documents,
        })
    }

    /// Fetch attachments, recording sizes on success and absence on
    /// failure. Never fails the item.
    async fn download_documents(&mut self, documents: &mut [crate::types::RawDocument], report: &mut CollectReport) {
        let Some(downloader) = self.downloader.as_deref() else {
            return;
        };
        let policy = RetryPolicy::new(self.config().max_download_attempts, 500);

        let files_dir = match self.store.files_dir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "files directory unavailable, skipping downloads");
                return;
            }
        };

        for document in documents.iter_mut() {
            match fetch_with_retry(downloader, &document.download_url, &policy).await {
                Ok(bytes) => {
                    let path = files_dir.join(format!("{}_{}", document.id, safe_file_name(&document.file_name)));
                    if let Err(e) = std::fs::write(&path, &bytes) {
                        warn!(path = %path.display(), error = %e, "could not persist attachment");
                        report.documents_missing += 1;
                        continue;
                    }
                    document.file_size_bytes = Some(bytes.len() as u64);
                    report.documents_downloaded += 1;
                }
                Err(e) => {
                    warn!(
                        url = %document.download_url,
                        error = %e,
                        "attachment unavailable, recording as missing"
                    );
                    report.documents_missing += 1;
                }
            }
        }
    }

    async fn pause(&self, delay_ms: u64) {
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

/// Reduce an arbitrary file name to something safe on disk.
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
