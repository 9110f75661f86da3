use approx::assert_relative_eq;
use stockchart_rs::calibration::{
    AutoDateCalibratorOptions, DateCalibrationInput, DateCalibrator, DateCalibratorKind,
    DateCalibratorOptions, FixedDateCalibratorOptions, FixedValueCalibratorOptions,
    IntervalValueCalibratorOptions, TextMetrics, ValueCalibrationInput, ValueCalibrator,
    ValueCalibratorKind, ValueCalibratorOptions, minor_ticks_between,
};
use stockchart_rs::core::{DataSeries, DateProjection, Padding, Rect, ScaleKind, ValueProjection};
use stockchart_rs::render::TextHAlign;
use serde_json::json;
use stockchart_rs::ChartError;
use stockchart_rs::state::Stateful;

const MINUTE: i64 = 60_000;

fn minute_dates(count: usize) -> DataSeries<i64> {
    // 2024-01-02 09:30 UTC
    let start = 1_704_187_800_000;
    DataSeries::from_values(
        "dates",
        (0..count).map(|i| Some(start + i as i64 * MINUTE)).collect(),
    )
}

fn date_input(dates: &DataSeries<i64>) -> DateCalibrationInput<'_> {
    let frame = Rect::new(0.0, 0.0, 600.0, 300.0);
    DateCalibrationInput {
        projection: DateProjection::from_parts(frame, 0.0, 5.0, dates, MINUTE as f64),
        panel_padding: Padding::default(),
        text_bounds: Rect::new(0.0, 300.0, 600.0, 24.0),
        max_x: frame.right(),
        max_allowed_record: dates.len() as f64 - 1.0,
        metrics: TextMetrics::default(),
    }
}

fn value_input(min: f64, max: f64) -> ValueCalibrationInput {
    ValueCalibrationInput {
        projection: ValueProjection::from_parts(
            Rect::new(0.0, 10.0, 600.0, 400.0),
            min,
            max,
            ScaleKind::Linear,
        ),
        panel_frame: Rect::new(0.0, 0.0, 600.0, 420.0),
        padding: Padding::new(0.0, 10.0, 0.0, 10.0),
        panel_padding: Padding::default(),
        metrics: TextMetrics::default(),
    }
}

#[test]
fn auto_date_labels_do_not_overlap() {
    let dates = minute_dates(120);
    let input = date_input(&dates);
    let mut calibrator = DateCalibrator::default();
    calibrator.calibrate(Some(&input));

    let ticks = calibrator.major_ticks();
    assert!(ticks.len() >= 2, "expected several labels, got {}", ticks.len());
    let metrics = TextMetrics::default();
    for pair in ticks.windows(2) {
        assert!(pair[0].x < pair[1].x);
        assert!(pair[0].date_ms < pair[1].date_ms);
        let left_end = pair[0].x + metrics.text_width(&pair[0].text) / 2.0;
        let right_start = pair[1].x - metrics.text_width(&pair[1].text) / 2.0;
        assert!(left_end + 30.0 <= right_start + 1.0);
    }
}

#[test]
fn date_calibration_is_idempotent() {
    let dates = minute_dates(120);
    let input = date_input(&dates);
    let mut calibrator = DateCalibrator::default();

    calibrator.calibrate(Some(&input));
    let first = calibrator.major_ticks().to_vec();
    calibrator.calibrate(Some(&input));
    assert_eq!(calibrator.major_ticks(), first.as_slice());
}

#[test]
fn calibrate_without_input_clears_ticks() {
    let dates = minute_dates(120);
    let input = date_input(&dates);
    let mut calibrator = DateCalibrator::default();
    calibrator.calibrate(Some(&input));
    assert!(!calibrator.major_ticks().is_empty());

    calibrator.calibrate(None);
    assert!(calibrator.major_ticks().is_empty());
    assert!(calibrator.minor_ticks().is_empty());

    let mut values = ValueCalibrator::default();
    values.calibrate(Some(&value_input(0.0, 100.0)));
    assert!(!values.major_ticks().is_empty());
    values.calibrate(None);
    assert!(values.major_ticks().is_empty());
}

#[test]
fn fixed_date_labels_span_the_frame() {
    let dates = minute_dates(120);
    let input = date_input(&dates);
    let mut calibrator = DateCalibrator::new(DateCalibratorOptions::Fixed(
        FixedDateCalibratorOptions::default(),
    ))
    .expect("fixed calibrator");
    calibrator.calibrate(Some(&input));

    let ticks = calibrator.major_ticks();
    assert_eq!(ticks.len(), 3);
    assert_relative_eq!(ticks[0].x, 0.0);
    assert_relative_eq!(ticks[1].x, 300.0);
    assert_relative_eq!(ticks[2].x, 600.0);
    assert_eq!(ticks[0].text_align, TextHAlign::Left);
    assert_eq!(ticks[1].text_align, TextHAlign::Center);
    assert_eq!(ticks[2].text_align, TextHAlign::Right);
    assert_eq!(ticks[1].date_ms, dates.value(60).expect("date"));
}

#[test]
fn auto_date_options_reject_non_positive_offset() {
    let options = DateCalibratorOptions::Auto(AutoDateCalibratorOptions {
        min_labels_offset: 0.0,
        minor_ticks_count: 0,
    });
    assert!(DateCalibrator::new(options).is_err());
}

#[test]
fn fixed_value_labels_cover_padded_height() {
    let mut calibrator = ValueCalibrator::new(ValueCalibratorOptions::Fixed(
        FixedValueCalibratorOptions::default(),
    ))
    .expect("fixed calibrator");
    calibrator.calibrate(Some(&value_input(0.0, 100.0)));

    let texts: Vec<&str> = calibrator
        .major_ticks()
        .iter()
        .map(|tick| tick.text.as_str())
        .collect();
    assert_eq!(texts, ["100.00", "50.00", "0.00"]);
    let ys: Vec<f64> = calibrator.major_ticks().iter().map(|tick| tick.y).collect();
    assert_eq!(ys, [10.0, 210.0, 410.0]);
}

#[test]
fn interval_value_labels_sit_on_multiples() {
    let options = IntervalValueCalibratorOptions {
        interval: 5.0,
        ..IntervalValueCalibratorOptions::default()
    };
    let mut calibrator =
        ValueCalibrator::new(ValueCalibratorOptions::Interval(options)).expect("calibrator");
    calibrator.calibrate(Some(&value_input(0.0, 100.0)));

    let ticks = calibrator.major_ticks();
    assert!(ticks.len() > 1);
    for tick in ticks {
        let multiple = tick.value / 5.0;
        assert_relative_eq!(multiple, multiple.round(), epsilon = 1e-9);
    }
    for pair in ticks.windows(2) {
        assert!(pair[1].y - pair[0].y >= 12.0 + 10.0);
        assert!(pair[0].value > pair[1].value);
    }
}

#[test]
fn interval_larger_than_range_falls_back_to_edge_labels() {
    let options = IntervalValueCalibratorOptions {
        interval: 1_000.0,
        ..IntervalValueCalibratorOptions::default()
    };
    let mut calibrator =
        ValueCalibrator::new(ValueCalibratorOptions::Interval(options)).expect("calibrator");
    calibrator.calibrate(Some(&value_input(0.0, 100.0)));

    let ticks = calibrator.major_ticks();
    assert_eq!(ticks.len(), 2);
    assert_relative_eq!(ticks[0].y, 16.0);
    assert_relative_eq!(ticks[1].y, 404.0);
}

#[test]
fn interval_options_are_validated() {
    let options = IntervalValueCalibratorOptions {
        interval: 0.0,
        ..IntervalValueCalibratorOptions::default()
    };
    assert!(ValueCalibrator::new(ValueCalibratorOptions::Interval(options)).is_err());
}

#[test]
fn auto_value_labels_skip_repeated_texts() {
    let mut calibrator = ValueCalibrator::default();
    calibrator.calibrate(Some(&value_input(1.0, 1.001)));

    let ticks = calibrator.major_ticks();
    assert!(!ticks.is_empty());
    for pair in ticks.windows(2) {
        assert_ne!(pair[0].text, pair[1].text);
    }
}

#[test]
fn minor_ticks_split_major_gaps() {
    let minor = minor_ticks_between(&[0.0, 100.0, 200.0], 3);
    let positions: Vec<f64> = minor.iter().map(|tick| tick.position).collect();
    assert_eq!(positions, [25.0, 50.0, 75.0, 125.0, 150.0, 175.0]);
    assert!(minor_ticks_between(&[0.0, 100.0], 0).is_empty());
}

#[test]
fn calibrator_state_round_trips_with_class_name() {
    let calibrator = ValueCalibrator::with_kind(ValueCalibratorKind::Interval);
    let state = calibrator.save_state().expect("save");
    assert_eq!(state["className"], "StockChartX.IntervalValueScaleCalibrator");

    let mut restored = ValueCalibrator::default();
    restored.load_state(&state).expect("load");
    assert_eq!(restored.kind(), ValueCalibratorKind::Interval);
    assert_eq!(restored.options(), calibrator.options());

    let mut date = DateCalibrator::default();
    date.load_state(&DateCalibrator::with_kind(DateCalibratorKind::Fixed).save_state().expect("save"))
        .expect("load");
    assert_eq!(date.kind(), DateCalibratorKind::Fixed);
}

#[test]
fn calibrator_state_rejects_unknown_class_name() {
    let unknown = json!({ "className": "StockChartX.Bogus", "options": {} });

    let mut value = ValueCalibrator::with_kind(ValueCalibratorKind::Fixed);
    assert!(matches!(
        value.load_state(&unknown),
        Err(ChartError::NotRegistered(ref name)) if name == "StockChartX.Bogus"
    ));
    assert_eq!(value.kind(), ValueCalibratorKind::Fixed);

    let mut date = DateCalibrator::default();
    assert!(matches!(date.load_state(&unknown), Err(ChartError::NotRegistered(_))));
    assert_eq!(date.kind(), DateCalibrator::default().kind());
}
