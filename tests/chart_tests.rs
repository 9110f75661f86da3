use approx::assert_relative_eq;
use stockchart_rs::api::{ChartPanel, ChartPanelObject, ChartState};
use stockchart_rs::core::{Bar, Point, Viewport, VisibleRange};
use stockchart_rs::datafeed::{BarsRequest, BarsResponse, Datafeed, RequestKind};
use stockchart_rs::interaction::{EventKind, MouseButton, WindowEvent};
use stockchart_rs::price_style::PriceStyleKind;
use stockchart_rs::render::NullRenderer;
use stockchart_rs::store::MemoryDataStore;
use stockchart_rs::{Chart, ChartConfig, ChartError, ChartEvent, ChartResult};

const MINUTE: i64 = 60_000;

fn bars(range: std::ops::Range<i64>) -> Vec<Bar> {
    range
        .map(|i| {
            let open = 100.0 + (i % 7) as f64;
            let close = open + if i % 2 == 0 { 1.5 } else { -1.0 };
            Bar::new(i * MINUTE, open, open.max(close) + 0.5, open.min(close) - 0.5, close, 1_000.0)
                .expect("valid bar")
        })
        .collect()
}

fn chart(chart_id: &str) -> Chart<NullRenderer> {
    let config = ChartConfig::new(chart_id, Viewport::new(800, 600)).with_history_page_size(50);
    Chart::new(NullRenderer::default(), config).expect("chart")
}

fn chart_with_bars(count: i64) -> Chart<NullRenderer> {
    let mut chart = chart("test");
    chart.set_bars(&bars(0..count)).expect("set bars");
    chart
}

fn range(chart: &Chart<NullRenderer>) -> VisibleRange {
    chart.date_scale().visible_range().expect("visible range")
}

fn at(kind: EventKind, x: f64, y: f64, timestamp_ms: i64) -> WindowEvent {
    WindowEvent::new(kind, Point::new(x, y), timestamp_ms)
}

struct PagedFeed {
    bars: Vec<Bar>,
}

impl Datafeed for PagedFeed {
    async fn send(&self, request: BarsRequest) -> ChartResult<BarsResponse> {
        let end = request.end_date_ms.unwrap_or(i64::MAX);
        let older: Vec<Bar> = self.bars.iter().filter(|bar| bar.date < end).copied().collect();
        let start = older.len().saturating_sub(request.count);
        Ok(BarsResponse {
            request_id: request.id,
            bars: older[start..].to_vec(),
        })
    }
}

struct OfflineFeed;

impl Datafeed for OfflineFeed {
    async fn send(&self, _request: BarsRequest) -> ChartResult<BarsResponse> {
        Err(ChartError::Io("connection refused".to_owned()))
    }
}

#[test]
fn new_chart_has_one_price_panel_and_no_range() {
    let chart = chart("test");
    assert_eq!(chart.panels().len(), 1);
    assert!(chart.panels()[0].shows_price());
    assert!(chart.date_scale().visible_range().is_none());
    assert_eq!(chart.plot_frame().width, 736.0);
    assert_eq!(chart.plot_frame().height, 576.0);
    assert_eq!(chart.state_key(), "test.state");
}

#[test]
fn invalid_viewport_is_rejected() {
    let config = ChartConfig::new("test", Viewport::new(0, 600));
    assert!(Chart::new(NullRenderer::default(), config).is_err());

    let mut chart = chart("test");
    assert!(matches!(
        chart.resize(Viewport::new(800, 0)),
        Err(ChartError::InvalidViewport { width: 800, height: 0 })
    ));
}

#[test]
fn set_bars_shows_every_record() {
    let chart = chart_with_bars(100);
    assert_eq!(range(&chart), VisibleRange { first: 0.0, last: 99.0 });
    assert_eq!(chart.record_count(), 100);
    assert_relative_eq!(chart.date_scale().column_width(), 7.36);
}

#[test]
fn live_bars_append_and_update() {
    let mut chart = chart_with_bars(10);
    let next = bars(10..11)[0];
    chart.append_bar(next).expect("append");
    assert_eq!(chart.bars().len(), 11);

    let mut updated = next;
    updated.close = updated.high;
    chart.update_last_bar(updated).expect("update");
    assert_eq!(chart.bars().bar(10).map(|bar| bar.close), Some(updated.high));

    assert!(chart.append_bar(bars(0..1)[0]).is_err());
    assert_eq!(chart.trim_bars(5).expect("trim"), 6);
    assert_eq!(chart.bars().len(), 5);
}

#[test]
fn wheel_zooms_in_and_reports_viewport_change() {
    let mut chart = chart_with_bars(100);
    assert!(chart.handle_event(&WindowEvent::wheel(Point::new(368.0, 300.0), -120.0, 0)));

    let zoomed = range(&chart);
    assert_relative_eq!(zoomed.first, 5.0, epsilon = 1e-9);
    assert_relative_eq!(zoomed.last, 94.0, epsilon = 1e-9);
    assert_eq!(chart.take_events(), [ChartEvent::ViewportChanged]);
    assert!(chart.take_events().is_empty());
}

#[test]
fn wheel_out_at_full_range_stays_pinned() {
    let mut chart = chart_with_bars(100);
    chart.handle_event(&WindowEvent::wheel(Point::new(368.0, 300.0), 120.0, 0));

    assert_eq!(range(&chart), VisibleRange { first: 0.0, last: 99.0 });
    assert!(chart.take_events().is_empty());
}

#[test]
fn drag_scrolls_then_flings() {
    let mut chart = chart_with_bars(100);
    chart.date_scale_mut().set_visible_records(50.0, 99.0).expect("range");

    assert!(chart.handle_event(&at(EventKind::MouseDown, 400.0, 300.0, 0)));
    assert!(chart.handle_event(&at(EventKind::MouseMove, 460.0, 300.0, 16)));
    let dragged = range(&chart);
    assert_relative_eq!(dragged.first, 50.0 - 60.0 / 14.72, epsilon = 1e-9);
    assert_relative_eq!(dragged.columns(), 50.0, epsilon = 1e-9);

    assert!(chart.handle_event(&at(EventKind::MouseUp, 460.0, 300.0, 32)));
    assert!(chart.is_kinetic_pan_running());
    assert!(chart.needs_frame());

    assert!(chart.tick(100));
    assert!(range(&chart).first < dragged.first);
    assert!(chart.take_events().contains(&ChartEvent::ViewportChanged));

    chart.stop_kinetic_pan();
    assert!(!chart.is_kinetic_pan_running());
    assert!(!chart.needs_frame());
}

#[test]
fn double_click_restores_full_range() {
    let mut chart = chart_with_bars(100);
    chart.handle_event(&WindowEvent::wheel(Point::new(368.0, 300.0), -120.0, 0));
    chart.take_events();

    assert!(chart.handle_event(&at(EventKind::DoubleClick, 300.0, 200.0, 50)));
    assert_eq!(range(&chart), VisibleRange { first: 0.0, last: 99.0 });
    assert_eq!(
        chart.take_events(),
        [
            ChartEvent::DoubleClicked(Point::new(300.0, 200.0)),
            ChartEvent::ViewportChanged,
        ]
    );
}

#[test]
fn right_click_opens_context_menu() {
    let mut chart = chart_with_bars(10);
    let event = at(EventKind::ContextMenu, 120.0, 80.0, 0).with_button(MouseButton::Right);
    assert!(chart.handle_event(&event));
    assert_eq!(chart.take_events(), [ChartEvent::ContextMenu(Point::new(120.0, 80.0))]);
}

#[test]
fn clicking_an_object_selects_it() {
    let mut chart = chart_with_bars(10);
    let date = 5 * MINUTE;
    let id = chart
        .add_object(0, ChartPanelObject::highlighted_column(date).expect("column"))
        .expect("add");
    let x = chart.projection(0).expect("projection").x.x_by_date(date);

    assert!(chart.handle_event(&at(EventKind::Click, x, 300.0, 0)));
    assert_eq!(chart.take_events(), [ChartEvent::ObjectSelected(id)]);
    assert_eq!(chart.selected_object(), Some(id));
    assert!(chart.object(id).expect("object").is_selected());

    // A click on empty plot area clears the selection.
    assert!(chart.handle_event(&at(EventKind::Click, 20.0, 300.0, 100)));
    assert_eq!(chart.take_events(), [ChartEvent::SelectionCleared]);
    assert_eq!(chart.selected_object(), None);
    assert!(!chart.object(id).expect("object").is_selected());
}

#[test]
fn removed_objects_cannot_be_selected() {
    let mut chart = chart_with_bars(10);
    let id = chart
        .add_object(0, ChartPanelObject::spread(104.0, 103.0).expect("spread"))
        .expect("add");
    chart.select_object(Some(id)).expect("select");

    let removed = chart.remove_object(id).expect("removed");
    assert!(removed.id().is_none());
    assert_eq!(chart.selected_object(), None);
    assert!(matches!(chart.select_object(Some(id)), Err(ChartError::NotFound(_))));
    assert!(chart.remove_object(id).is_none());
    assert!(chart.add_object(3, ChartPanelObject::spread(1.0, 0.0).expect("spread")).is_err());
}

#[test]
fn render_draws_bars_and_objects() {
    let mut chart = chart_with_bars(10);
    chart.render().expect("render");
    let renderer = chart.renderer();
    assert_eq!(renderer.frames_rendered, 1);
    // Background plus one body per candle.
    assert!(renderer.last_rect_count >= 11);
    assert!(renderer.last_text_count > 0);
    let rects = renderer.last_rect_count;

    chart
        .add_object(0, ChartPanelObject::highlighted_column(3 * MINUTE).expect("column"))
        .expect("add");
    chart.render().expect("render");
    assert_eq!(chart.renderer().last_rect_count, rects + 1);
    assert_eq!(chart.renderer().frames_rendered, 2);
}

#[test]
fn price_panel_cannot_be_removed() {
    let mut chart = chart_with_bars(10);
    let index = chart.add_panel(ChartPanel::new(0.5).expect("panel")).expect("add panel");
    assert_eq!(index, 1);

    assert!(matches!(chart.remove_panel(0), Err(ChartError::InvalidConfig(_))));
    assert!(matches!(chart.remove_panel(5), Err(ChartError::NotFound(_))));
    chart.remove_panel(1).expect("remove");
    assert_eq!(chart.panels().len(), 1);
}

#[test]
fn derived_price_style_changes_record_count() {
    let mut chart = chart_with_bars(100);
    chart
        .set_price_style(PriceStyleKind::HeikinAshi.create_default())
        .expect("heikin ashi");
    chart.layout().expect("layout");
    assert_eq!(chart.record_count(), 100);
    assert_eq!(range(&chart), VisibleRange { first: 0.0, last: 99.0 });

    chart
        .load_price_style(&serde_json::json!({
            "className": "renko",
            "options": { "boxSize": { "kind": "fixed", "price": 5.0 } }
        }))
        .expect("renko");
    chart.layout().expect("layout");
    assert_eq!(chart.price_style().kind(), PriceStyleKind::Renko);
    assert_eq!(chart.record_count(), chart.plotted_bars().len());
    assert!(chart.plotted_bars().len() < 100);
}

#[test]
fn accepted_page_and_stale_response() {
    let mut chart = chart("test");
    let stale = chart.request_bars(RequestKind::Bars);
    let current = chart.request_bars(RequestKind::Bars);
    assert_eq!(current.count, 50);

    let page = BarsResponse {
        request_id: stale.id,
        bars: bars(0..50),
    };
    assert!(!chart.accept_bars(&stale, page).expect("stale"));
    assert!(chart.bars().is_empty());

    let page = BarsResponse {
        request_id: current.id,
        bars: bars(0..50),
    };
    assert!(chart.accept_bars(&current, page).expect("accepted"));
    assert_eq!(chart.bars().len(), 50);
    assert_eq!(range(&chart), VisibleRange { first: 0.0, last: 49.0 });
}

#[tokio::test]
async fn scrolling_to_the_oldest_bar_loads_history() {
    let feed = PagedFeed { bars: bars(0..120) };
    let mut chart = chart("test");
    assert!(chart.load_initial_bars(&feed).await.expect("initial page"));
    assert_eq!(chart.bars().len(), 50);
    assert_eq!(chart.bars().dates().first_value(), Some(70 * MINUTE));

    assert!(chart.poll_history_request().is_none());
    let record_count = chart.record_count();
    chart.date_scale_mut().scroll_on_records(5.0, record_count);
    let request = chart.poll_history_request().expect("history request");
    assert_eq!(request.kind, RequestKind::MoreBars);
    assert_eq!(request.end_date_ms, Some(70 * MINUTE));
    assert!(chart.poll_history_request().is_none());

    let response = feed.send(request.clone()).await.expect("older page");
    assert!(chart.accept_bars(&request, response).expect("accept"));
    assert_eq!(chart.bars().len(), 100);
    // The same bars stay on screen.
    assert_eq!(range(&chart), VisibleRange { first: 50.0, last: 99.0 });
}

#[tokio::test]
async fn failed_history_request_reports_the_error() {
    let mut chart = chart_with_bars(20);
    let err = chart.load_more_history(&OfflineFeed).await.expect_err("offline");
    assert!(matches!(err, ChartError::Io(_)));
    assert_eq!(chart.bars().len(), 20);

    let record_count = chart.record_count();
    chart.date_scale_mut().scroll_on_records(5.0, record_count);
    assert!(chart.poll_history_request().is_some());
}

#[test]
fn state_round_trips_through_json_contract() {
    let mut source = chart_with_bars(100);
    source.add_panel(ChartPanel::new(0.5).expect("panel")).expect("add panel");
    source
        .add_object(1, ChartPanelObject::spread(105.0, 104.5).expect("spread"))
        .expect("add object");
    source
        .set_price_style(PriceStyleKind::LineBreak.create_default())
        .expect("style");
    source.render().expect("render");
    let json = source.state_json_contract_v1_pretty().expect("json");
    assert!(json.contains("\"schema_version\": 1"));

    let mut restored = chart("test");
    restored.set_bars(&bars(0..100)).expect("bars");
    restored.load_state_json(&json).expect("load");

    assert_eq!(restored.panels().len(), 2);
    assert_eq!(restored.panels()[1].objects().len(), 1);
    assert_eq!(restored.price_style().kind(), PriceStyleKind::LineBreak);
    assert_eq!(
        restored.save_state().expect("save"),
        source.save_state().expect("save")
    );

    let bare = serde_json::to_string(&source.save_state().expect("save")).expect("bare json");
    assert!(ChartState::from_json_compat_str(&bare).is_ok());
}

#[test]
fn state_without_price_panel_is_rejected() {
    let source = chart_with_bars(10);
    let mut state = source.save_state().expect("save");
    state.panels.clear();

    let mut target = chart("test");
    target
        .add_panel(ChartPanel::new(1.0).expect("panel"))
        .expect("add panel");
    assert!(matches!(target.load_state(&state), Err(ChartError::InvalidData(_))));
    assert_eq!(target.panels().len(), 2);
}

#[tokio::test]
async fn state_persists_in_a_data_store() {
    let store = MemoryDataStore::new();
    let mut source = chart_with_bars(10);
    source
        .add_object(0, ChartPanelObject::highlighted_column(2 * MINUTE).expect("column"))
        .expect("add");
    source.save_to_store(&store).await.expect("save");

    let mut same_id = chart("test");
    assert!(same_id.load_from_store(&store).await.expect("load"));
    assert_eq!(same_id.panels()[0].objects().len(), 1);

    let mut other_id = chart("other");
    assert!(!other_id.load_from_store(&store).await.expect("load"));
    assert!(other_id.panels()[0].objects().is_empty());
}
