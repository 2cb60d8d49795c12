//! End-to-end collection: mock accessor → controller → batch files.

use chrono::NaiveDate;

use harvest::collect::{CollectionController, DateWindow, Session};
use harvest::config::SourceConfig;
use harvest::store::BatchStore;
use harvest::testing::MockAccessor;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn listing_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(id, title, date)| {
            format!(
                r#"<tr>
                    <td><a href="/opp/{id}" data-id="{id}">{title}</a></td>
                    <td class="posted-date">{date}</td>
                </tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><table class="listing"><tbody>{body}</tbody></table></body></html>"#
    )
}

fn detail_page(id: &str, title: &str, status: &str) -> String {
    format!(
        r#"<html><body>
            <h1>{title}</h1>
            <table>
                <tr><th>Event ID</th><td>{id}</td></tr>
                <tr><th>Status</th><td>{status}</td></tr>
                <tr><th>Entity</th><td>Cherokee Nation</td></tr>
            </table>
            <div class="description">Details for {title}.</div>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_collect_run_writes_batches_and_stops_early() {
    // Page 1: three items inside the window; the middle detail page is
    // unreachable. Page 2: one admitted item, then an item before the
    // window start, which must stop pagination before the third row.
    let accessor = MockAccessor::new()
        .with_page(
            "https://x.test/list?page=1",
            listing_page(&[
                ("101", "Roof Repair", "2024-01-06"),
                ("102", "Paving", "2024-01-05"),
                ("103", "HVAC Service", "2024-01-04"),
            ]),
        )
        .with_page(
            "https://x.test/list?page=2",
            listing_page(&[
                ("104", "Fencing", "2024-01-02"),
                ("105", "Old Award", "2023-12-30"),
                ("106", "Never Visited", "2024-01-01"),
            ]),
        )
        .with_page("https://x.test/opp/101", detail_page("101", "Roof Repair", "Open"))
        // 102 intentionally unregistered: its detail visit must fail soft
        .with_page("https://x.test/opp/103", detail_page("103", "HVAC Service", "Closed"))
        .with_page("https://x.test/opp/104", detail_page("104", "Fencing", "Open"));

    let config = SourceConfig::new("okbids", "https://x.test/list?page={page}")
        .with_page_size(3)
        .with_delays(0, 0);

    let session = Session::new("okbids", DateWindow::new(d("2024-01-01"), d("2024-01-07")));
    let root = tempfile::tempdir().unwrap();
    let store = BatchStore::create(root.path(), &session).unwrap();
    let session_dir = store.session_dir().to_path_buf();

    let controller = CollectionController::new(accessor, config, session, store);
    let report = controller.run().await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.items_seen, 6);
    // Rows 101, 103, 104 succeed; 102 is admitted but its visit fails
    assert_eq!(report.items_admitted, 4);
    assert_eq!(report.items_failed, 1);
    assert_eq!(report.batches_written, 2);
    assert!(report.stopped_early);
    assert!(!report.is_clean());

    // Read the persisted batches back in order
    let store = BatchStore::open(&session_dir).unwrap();
    let batches = store.read_batches().unwrap();
    assert_eq!(batches.len(), 2);

    let first = &batches[0];
    assert_eq!(first.metadata.batch_number, 1);
    assert_eq!(first.metadata.source, "okbids");
    assert_eq!(first.metadata.total_items, 2);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].opportunity.external_id.as_deref(), Some("101"));
    assert_eq!(first.items[0].opportunity.title.as_deref(), Some("Roof Repair"));
    assert_eq!(first.items[0].opportunity.status.as_deref(), Some("Open"));
    assert_eq!(
        first.items[0].opportunity.entity_name.as_deref(),
        Some("Cherokee Nation")
    );
    assert_eq!(first.items[1].opportunity.external_id.as_deref(), Some("103"));

    let second = &batches[1];
    assert_eq!(second.metadata.batch_number, 2);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].opportunity.external_id.as_deref(), Some("104"));
}

#[tokio::test]
async fn test_short_page_ends_pagination() {
    let accessor = MockAccessor::new()
        .with_page(
            "https://x.test/list?page=1",
            listing_page(&[("201", "Only Item", "2024-01-03")]),
        )
        .with_page("https://x.test/opp/201", detail_page("201", "Only Item", "Open"));

    let config = SourceConfig::new("okbids", "https://x.test/list?page={page}")
        .with_page_size(25)
        .with_delays(0, 0);

    let session = Session::new("okbids", DateWindow::new(d("2024-01-01"), d("2024-01-07")));
    let root = tempfile::tempdir().unwrap();
    let store = BatchStore::create(root.path(), &session).unwrap();

    let report = CollectionController::new(accessor, config, session, store)
        .run()
        .await
        .unwrap();

    // One short page: no second fetch, no early-stop flag
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.batches_written, 1);
    assert!(!report.stopped_early);
}

#[tokio::test]
async fn test_unreachable_listing_is_fatal() {
    let accessor = MockAccessor::new();
    let config = SourceConfig::new("okbids", "https://x.test/list?page={page}").with_delays(0, 0);
    let session = Session::new("okbids", DateWindow::new(d("2024-01-01"), d("2024-01-07")));
    let root = tempfile::tempdir().unwrap();
    let store = BatchStore::create(root.path(), &session).unwrap();

    let result = CollectionController::new(accessor, config, session, store)
        .run()
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_identical_runs_produce_identical_record_ids() {
    let build = || {
        MockAccessor::new()
            .with_page(
                "https://x.test/list?page=1",
                listing_page(&[("301", "Stable Item", "2024-01-03")]),
            )
            .with_page("https://x.test/opp/301", detail_page("301", "Stable Item", "Open"))
    };

    let mut ids = Vec::new();
    for _ in 0..2 {
        let config = SourceConfig::new("okbids", "https://x.test/list?page={page}")
            .with_page_size(25)
            .with_delays(0, 0);
        let session = Session::new("okbids", DateWindow::new(d("2024-01-01"), d("2024-01-07")));
        let root = tempfile::tempdir().unwrap();
        let store = BatchStore::create(root.path(), &session).unwrap();
        let session_dir = store.session_dir().to_path_buf();

        CollectionController::new(build(), config, session, store)
            .run()
            .await
            .unwrap();

        let batches = BatchStore::open(&session_dir).unwrap().read_batches().unwrap();
        ids.push(batches[0].items[0].opportunity.id.clone());
    }

    assert_eq!(ids[0], ids[1]);
}
