use approx::assert_relative_eq;
use proptest::prelude::*;
use stockchart_rs::ChartError;
use stockchart_rs::core::{
    Bar, BarSeries, DataSeries, DateProjection, DateScale, DateScaleConfig, Dictionary, Periodicity,
    Projection, Rect, ScaleKind, TimeFrame, ValueProjection, ZoomMode, band_fill_path,
    first_non_null_value,
};

fn minute_dates(count: usize) -> DataSeries<i64> {
    DataSeries::from_values(
        "dates",
        (0..count).map(|i| Some(i as i64 * 60_000)).collect(),
    )
}

fn scale_with_range(first: f64, last: f64) -> DateScale {
    let mut scale = DateScale::new(DateScaleConfig::default()).expect("date scale");
    scale.set_frame(Rect::new(0.0, 0.0, 1000.0, 400.0));
    scale.set_visible_records(first, last).expect("visible records");
    scale
}

#[test]
fn dictionaries_compare_by_entries() {
    let mut first = Dictionary::new();
    first.add("open".to_owned(), 1.0).expect("add open");
    first.add("close".to_owned(), 2.0).expect("add close");
    let same = first.clone();
    assert_eq!(first, same);

    let mut reordered = Dictionary::new();
    reordered.add("close".to_owned(), 2.0).expect("add close");
    reordered.add("open".to_owned(), 1.0).expect("add open");
    // Equality follows the map contents, not insertion order.
    assert_eq!(first, reordered);

    reordered.remove(&"open".to_owned());
    assert_ne!(first, reordered);
}

proptest! {
    #[test]
    fn record_to_x_round_trips(
        first_visible in -50.0f64..500.0,
        column_width in 0.5f64..80.0,
        left in 0.0f64..200.0,
        record in -100.0f64..1_000.0
    ) {
        let dates = minute_dates(16);
        let projection = DateProjection::from_parts(
            Rect::new(left, 0.0, 900.0, 400.0),
            first_visible,
            column_width,
            &dates,
            60_000.0,
        );
        let x = projection.x_by_record(record);
        prop_assert!((projection.record_by_x(x) - record).abs() <= 1e-7);
    }

    #[test]
    fn linear_value_to_y_round_trips(
        min in -10_000.0f64..10_000.0,
        span in 0.01f64..10_000.0,
        value in -20_000.0f64..20_000.0
    ) {
        let projection = ValueProjection::from_parts(
            Rect::new(0.0, 20.0, 800.0, 500.0),
            min,
            min + span,
            ScaleKind::Linear,
        );
        let y = projection.y_by_value(value);
        let tolerance = 1e-9 * value.abs().max(span).max(1.0) * 1_000.0;
        prop_assert!((projection.value_by_y(y) - value).abs() <= tolerance);
    }

    #[test]
    fn logarithmic_value_to_y_round_trips(
        min in 0.0f64..1_000.0,
        span in 1.0f64..100_000.0,
        value in -1_000.0f64..100_000.0
    ) {
        let projection = ValueProjection::from_parts(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            min,
            min + span,
            ScaleKind::Logarithmic,
        );
        let y = projection.y_by_value(value);
        let restored = projection.value_by_y(y);
        prop_assert!((restored - value).abs() <= 1e-6 * value.abs().max(1.0));
    }

    #[test]
    fn dictionary_refuses_overwrites(keys in proptest::collection::vec(0u16..64, 1..64)) {
        let mut dictionary = Dictionary::new();
        let mut unique = Vec::new();
        for key in &keys {
            let added = dictionary.add(*key, u32::from(*key) * 2);
            if unique.contains(key) {
                prop_assert!(matches!(added, Err(ChartError::DuplicateKey(_))));
            } else {
                prop_assert!(added.is_ok());
                unique.push(*key);
            }
        }
        prop_assert_eq!(dictionary.count(), unique.len());
        prop_assert_eq!(dictionary.keys().copied().collect::<Vec<_>>(), unique.clone());
        for key in &unique {
            prop_assert_eq!(dictionary.get(key), Some(&(u32::from(*key) * 2)));
        }
    }

    #[test]
    fn dictionary_count_tracks_adds_and_removes(
        ops in proptest::collection::vec((any::<bool>(), 0u16..16), 1..96),
    ) {
        let mut dictionary = Dictionary::new();
        let mut expected: Vec<u16> = Vec::new();
        for (is_add, key) in ops {
            let before = dictionary.count();
            if is_add {
                let added = dictionary.add(key, key).is_ok();
                prop_assert_eq!(added, !expected.contains(&key));
                if added {
                    expected.push(key);
                    prop_assert_eq!(dictionary.count(), before + 1);
                    // Removing right away restores the previous count.
                    prop_assert!(dictionary.remove(&key));
                    prop_assert_eq!(dictionary.count(), before);
                    prop_assert!(dictionary.add(key, key).is_ok());
                }
            } else {
                let removed = dictionary.remove(&key);
                prop_assert_eq!(removed, expected.contains(&key));
                expected.retain(|existing| *existing != key);
                prop_assert!(!dictionary.remove(&key));
                prop_assert_eq!(dictionary.get(&key), None);
            }
            prop_assert_eq!(dictionary.count(), expected.len());
        }
        prop_assert_eq!(dictionary.keys().copied().collect::<Vec<_>>(), expected);
    }
}

#[test]
fn projection_uses_fractional_first_record() {
    let dates = minute_dates(10);
    let projection = DateProjection::from_parts(Rect::new(10.0, 0.0, 500.0, 300.0), 2.5, 20.0, &dates, 60_000.0);

    assert_relative_eq!(projection.x_by_record(2.5), 10.0);
    assert_relative_eq!(projection.x_by_record(4.0), 40.0);
    assert_relative_eq!(projection.x_by_record_centered(4.7), 50.0);
    assert_relative_eq!(projection.column_width(), 20.0);
}

#[test]
fn projection_maps_dates_inside_and_beyond_the_data() {
    let dates = minute_dates(10);
    let projection = DateProjection::from_parts(Rect::new(0.0, 0.0, 500.0, 300.0), 0.0, 10.0, &dates, 60_000.0);

    assert_relative_eq!(projection.x_by_date(3 * 60_000), projection.x_by_record(3.0));
    assert_eq!(projection.date_by_x(projection.x_by_record(5.0)), 5 * 60_000);
    // One interval past the last bar is one column to the right.
    assert_relative_eq!(projection.x_by_date(10 * 60_000), projection.x_by_record(10.0));
}

#[test]
fn point_by_record_combines_both_axes() {
    let dates = minute_dates(4);
    let frame = Rect::new(0.0, 0.0, 400.0, 200.0);
    let projection = Projection::new(
        DateProjection::from_parts(frame, 0.0, 100.0, &dates, 60_000.0),
        ValueProjection::from_parts(frame, 0.0, 100.0, ScaleKind::Linear),
    );

    let point = projection.point_by_record(1.0, 25.0);
    assert_relative_eq!(point.x, 100.0);
    assert_relative_eq!(point.y, 150.0);
}

#[test]
fn min_max_skips_nulls_and_clamps_the_window() {
    let series = DataSeries::from_values("close", vec![Some(3.0), None, Some(-1.0), Some(8.0), None]);

    let all = series.min_max(0, 5).expect("values");
    assert_relative_eq!(all.min, -1.0);
    assert_relative_eq!(all.max, 8.0);

    let tail = series.min_max(3, 100).expect("tail");
    assert_relative_eq!(tail.min, 8.0);
    assert_relative_eq!(tail.max, 8.0);

    assert!(series.min_max(4, 1).is_none());
    assert!(series.min_max(0, 0).is_none());
    assert!(DataSeries::<f64>::new("empty").min_max(0, 3).is_none());
}

#[test]
fn first_non_null_value_skips_warm_up_gap() {
    let series = DataSeries::from_values("sma", vec![None, None, Some(4.5), Some(5.0)]);
    assert_eq!(first_non_null_value(&series), Some(4.5));
    assert_eq!(first_non_null_value(&DataSeries::from_values("none", vec![None])), None);
}

#[test]
fn bar_series_rejects_out_of_order_dates() {
    let mut bars = BarSeries::new("");
    bars.push(Bar::new(2_000, 10.0, 12.0, 9.0, 11.0, 100.0).expect("bar"))
        .expect("first push");

    let stale = Bar::new(1_000, 10.0, 12.0, 9.0, 11.0, 100.0).expect("bar");
    assert!(matches!(bars.push(stale), Err(ChartError::InvalidData(_))));
    assert_eq!(bars.len(), 1);
}

#[test]
fn bar_rejects_inconsistent_prices() {
    assert!(Bar::new(0, 10.0, 9.0, 11.0, 10.0, 0.0).is_err());
    assert!(Bar::new(0, 13.0, 12.0, 9.0, 10.0, 0.0).is_err());
    assert!(Bar::new(0, 10.0, 12.0, 9.0, 10.0, -1.0).is_err());
    assert!(Bar::new(0, f64::NAN, 12.0, 9.0, 10.0, 0.0).is_err());
}

#[test]
fn time_frame_converts_to_milliseconds() {
    let frame = TimeFrame::new(Periodicity::Minute, 5.0).expect("time frame");
    assert_relative_eq!(frame.to_time_interval(), 300_000.0);
    assert!(TimeFrame::new(Periodicity::Day, 0.0).is_err());
}

#[test]
fn scroll_moves_the_window_by_whole_pixels() {
    let mut scale = scale_with_range(50.0, 99.0);
    assert_relative_eq!(scale.column_width(), 20.0);

    let moved = scale.scroll_on_pixels(200.0, 100).expect("scroll");
    assert!(moved);
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 40.0);
    assert_relative_eq!(range.last, 89.0);

    assert!(!scale.scroll_on_pixels(2.0, 100).expect("tiny scroll"));
    assert!(scale.scroll_on_pixels(f64::NAN, 100).is_err());
}

#[test]
fn scroll_past_the_first_record_clamps_and_requests_history_once() {
    let mut scale = scale_with_range(50.0, 99.0);

    assert!(scale.scroll_on_pixels(2_000.0, 100).expect("scroll"));
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 0.0);
    assert_relative_eq!(range.last, 49.0);

    assert!(scale.take_history_request());
    assert!(!scale.take_history_request());

    // Pushing against the left edge again stays quiet until the page arrives.
    assert!(scale.scroll_on_records(5.0, 100));
    assert!(!scale.take_history_request());

    scale.on_more_history_request_completed();
    assert!(scale.scroll_on_records(5.0, 100));
    assert!(scale.take_history_request());
}

#[test]
fn scroll_cannot_pass_the_right_margin() {
    let mut scale = scale_with_range(50.0, 99.0);
    // max allowed = 99 + 1000 * 0.5 / 20 = 124
    assert_relative_eq!(scale.max_allowed_record(100), 124.0);
    assert!(scale.scroll_on_records(-25.0, 100));
    assert!(!scale.scroll_on_records(-1.0, 100));
}

#[test]
fn zoom_in_respects_minimum_visible_records() {
    let mut scale = scale_with_range(90.0, 99.0);

    assert!(scale.zoom_on_records(2.0, 2.0, 100));
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.columns(), 6.0);

    assert!(!scale.zoom_on_records(1.0, 1.0, 100));
    assert_relative_eq!(scale.visible_range().expect("range").columns(), 6.0);
}

#[test]
fn zoom_out_past_first_record_pins_left_edge() {
    let mut scale = scale_with_range(10.0, 60.0);
    assert!(!scale.zoom_on_records(-20.0, 0.0, 100));
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 0.0);
    assert_relative_eq!(range.last, 60.0);
}

#[test]
fn pin_left_zoom_keeps_first_record() {
    let config = DateScaleConfig {
        zoom_mode: ZoomMode::PinLeft,
        ..DateScaleConfig::default()
    };
    let mut scale = DateScale::new(config).expect("date scale");
    scale.set_frame(Rect::new(0.0, 0.0, 1000.0, 400.0));
    scale.set_visible_records(20.0, 69.0).expect("range");

    assert!(scale.zoom_at(100.0, 0.0, 100).expect("zoom"));
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 20.0);
    assert_relative_eq!(range.last, 64.0);
}

#[test]
fn whole_record_mode_snaps_visible_range() {
    let config = DateScaleConfig {
        allow_partial_records: false,
        ..DateScaleConfig::default()
    };
    let mut scale = DateScale::new(config).expect("date scale");
    scale.set_frame(Rect::new(0.0, 0.0, 1000.0, 400.0));
    scale.set_visible_records(10.7, 40.2).expect("range");
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 10.0);
    assert_relative_eq!(range.last, 40.0);
}

#[test]
fn invalid_date_scale_config_is_rejected() {
    let config = DateScaleConfig {
        min_visible_records: 0.0,
        ..DateScaleConfig::default()
    };
    assert!(matches!(DateScale::new(config), Err(ChartError::InvalidConfig(_))));

    let config = DateScaleConfig {
        right_additional_space_ratio: 1.0,
        ..DateScaleConfig::default()
    };
    assert!(DateScale::new(config).is_err());
}

#[test]
fn band_path_closes_between_upper_and_lower() {
    let upper = DataSeries::from_values("upper", vec![Some(10.0), Some(12.0), Some(11.0)]);
    let lower = DataSeries::from_values("lower", vec![Some(5.0), Some(6.0), Some(4.0)]);
    let dates = minute_dates(3);
    let frame = Rect::new(0.0, 0.0, 300.0, 200.0);
    let projection = Projection::new(
        DateProjection::from_parts(frame, 0.0, 100.0, &dates, 60_000.0),
        ValueProjection::from_parts(frame, 0.0, 20.0, ScaleKind::Linear),
    );

    let path = band_fill_path(&upper, &lower, &projection, 0, 2);
    assert_eq!(path.len(), 7);
    assert_eq!(path[0], projection.point_by_record(0.0, 10.0));
    assert_eq!(path[3], projection.point_by_record(2.0, 4.0));
    assert_eq!(path[6], path[0]);
}

#[test]
fn band_path_is_empty_without_lower_values() {
    let upper = DataSeries::from_values("upper", vec![Some(10.0), Some(12.0)]);
    let lower = DataSeries::from_values("lower", vec![None, None]);
    let dates = minute_dates(2);
    let frame = Rect::new(0.0, 0.0, 200.0, 200.0);
    let projection = Projection::new(
        DateProjection::from_parts(frame, 0.0, 100.0, &dates, 60_000.0),
        ValueProjection::from_parts(frame, 0.0, 20.0, ScaleKind::Linear),
    );

    assert!(band_fill_path(&upper, &lower, &projection, 0, 1).is_empty());
    assert!(band_fill_path(&upper, &lower, &projection, 5, 9).is_empty());
}
