use serde_json::json;
use stockchart_rs::core::Bar;
use stockchart_rs::datafeed::{BarsRequest, BarsResponse, RequestKind, RequestTracker};
use stockchart_rs::store::{DataStore, MemoryDataStore};

fn response(request: &BarsRequest) -> BarsResponse {
    BarsResponse {
        request_id: request.id,
        bars: vec![Bar::new(0, 1.0, 2.0, 0.5, 1.5, 10.0).expect("bar")],
    }
}

#[tokio::test]
async fn memory_store_saves_loads_and_clears() {
    let store = MemoryDataStore::new();
    assert!(store.load("chart.state").await.expect("load").is_none());

    store.save("chart.state", "{}").await.expect("save");
    store.save("chart.state", "{\"v\":2}").await.expect("overwrite");
    assert_eq!(
        store.load("chart.state").await.expect("load").as_deref(),
        Some("{\"v\":2}")
    );
    assert_eq!(store.len().await, 1);

    store.clear(Some("chart.state")).await.expect("clear key");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn scoped_stores_share_entries_but_not_keys() {
    let shared = MemoryDataStore::with_prefix("a/");
    let other = shared.scoped("b/");
    shared.save("state", "first").await.expect("save a");
    other.save("state", "second").await.expect("save b");

    assert_eq!(shared.load("state").await.expect("load a").as_deref(), Some("first"));
    assert_eq!(other.load("state").await.expect("load b").as_deref(), Some("second"));

    shared.clear(None).await.expect("clear a");
    assert!(shared.is_empty().await);
    assert_eq!(other.len().await, 1);
    assert_eq!(other.prefix(), "b/");
}

#[tokio::test]
async fn overlapping_prefixes_stay_isolated() {
    let root = MemoryDataStore::new();
    let ten = root.scoped("chart10");
    let one = root.scoped("chart1");
    ten.save(".state", "ten").await.expect("save ten");
    one.save(".state", "one").await.expect("save one");
    root.save("chart1.state", "root").await.expect("save root");

    assert_eq!(one.len().await, 1);
    assert_eq!(root.len().await, 1);

    one.clear(None).await.expect("clear one");
    assert!(one.is_empty().await);
    assert_eq!(ten.load(".state").await.expect("load ten").as_deref(), Some("ten"));
    assert_eq!(root.load("chart1.state").await.expect("load root").as_deref(), Some("root"));
}

#[test]
fn newer_request_supersedes_older_one() {
    let mut tracker = RequestTracker::new();
    let first = tracker.issue("chart", RequestKind::Bars, 100, None);
    let second = tracker.issue("chart", RequestKind::Bars, 100, None);
    assert!(second.id > first.id);
    assert!(!tracker.is_alive(&first));

    assert_eq!(tracker.complete(&first, &response(&first)), None);
    assert_eq!(tracker.complete(&second, &response(&second)), Some(RequestKind::Bars));
    assert_eq!(tracker.in_flight_count(), 0);

    // A completed request cannot complete twice.
    assert_eq!(tracker.complete(&second, &response(&second)), None);
}

#[test]
fn requests_are_tracked_per_chart_and_kind() {
    let mut tracker = RequestTracker::new();
    let bars = tracker.issue("chart", RequestKind::Bars, 100, None);
    let more = tracker.issue("chart", RequestKind::MoreBars, 100, Some(60_000));
    let other_chart = tracker.issue("other", RequestKind::Bars, 50, None);

    assert_eq!(tracker.in_flight_count(), 3);
    assert!(tracker.is_alive(&bars));
    assert_eq!(tracker.pending("chart", RequestKind::MoreBars), Some(more.id));
    assert_eq!(tracker.pending("other", RequestKind::MoreBars), None);

    let mismatched = BarsResponse {
        request_id: other_chart.id,
        bars: Vec::new(),
    };
    assert_eq!(tracker.complete(&bars, &mismatched), None);
    assert!(tracker.is_alive(&bars));

    assert!(tracker.cancel(&more));
    assert!(!tracker.cancel(&more));
    assert_eq!(tracker.complete(&more, &response(&more)), None);

    tracker.clear();
    assert_eq!(tracker.in_flight_count(), 0);
}

#[test]
fn bars_request_serializes_camel_case() {
    let mut tracker = RequestTracker::new();
    let request = tracker.issue("chart", RequestKind::MoreBars, 25, Some(60_000));
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(
        value,
        json!({
            "id": request.id,
            "chartId": "chart",
            "kind": "moreBars",
            "count": 25,
            "endDateMs": 60_000,
        })
    );

    let initial = tracker.issue("chart", RequestKind::Bars, 25, None);
    let value = serde_json::to_value(&initial).expect("serialize");
    assert!(value.get("endDateMs").is_none());
    let parsed: BarsRequest = serde_json::from_value(value).expect("parse");
    assert_eq!(parsed, initial);
}
