use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use stockchart_rs::calibration::{TextMetrics, ValueCalibrationInput, ValueCalibrator};
use stockchart_rs::core::{
    Bar, BarSeries, DataSeries, DateProjection, Padding, Rect, ScaleKind, Viewport, ValueProjection,
};
use stockchart_rs::price_style::{heikin_ashi, renko};
use stockchart_rs::render::NullRenderer;
use stockchart_rs::{Chart, ChartConfig};

fn generated_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.05;
            let open = base;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            Bar::new(i as i64 * 60_000, open, high, low, close, 1_000.0).expect("valid generated bar")
        })
        .collect()
}

fn bench_projection_round_trip(c: &mut Criterion) {
    let dates = DataSeries::from_values("dates", (0..2_000).map(|i| Some(i * 60_000)).collect());
    let frame = Rect::new(0.0, 0.0, 1_856.0, 1_056.0);
    let x = DateProjection::from_parts(frame, 250.0, 7.0, &dates, 60_000.0);
    let y = ValueProjection::from_parts(frame, 10.0, 2_500.0, ScaleKind::Logarithmic);

    c.bench_function("projection_round_trip", |b| {
        b.iter(|| {
            let px = x.x_by_record(black_box(512.25));
            let _ = x.record_by_x(px);
            let py = y.y_by_value(black_box(1_234.5));
            let _ = y.value_by_y(py);
        })
    });
}

fn bench_value_calibration(c: &mut Criterion) {
    let input = ValueCalibrationInput {
        projection: ValueProjection::from_parts(
            Rect::new(0.0, 10.0, 1_600.0, 860.0),
            1_234.5,
            1_987.25,
            ScaleKind::Linear,
        ),
        panel_frame: Rect::new(0.0, 0.0, 1_600.0, 880.0),
        padding: Padding::new(0.0, 10.0, 0.0, 10.0),
        panel_padding: Padding::default(),
        metrics: TextMetrics::default(),
    };
    let mut calibrator = ValueCalibrator::default();

    c.bench_function("value_calibration_auto", |b| {
        b.iter(|| calibrator.calibrate(Some(black_box(&input))))
    });
}

fn bench_price_style_conversion_10k(c: &mut Criterion) {
    let bars = BarSeries::from_bars("", &generated_bars(10_000)).expect("bar series");

    c.bench_function("heikin_ashi_10k", |b| b.iter(|| heikin_ashi(black_box(&bars))));
    c.bench_function("renko_10k", |b| b.iter(|| renko(black_box(&bars), black_box(0.5))));
}

fn bench_chart_render_2k(c: &mut Criterion) {
    let config = ChartConfig::new("bench", Viewport::new(1600, 900));
    let mut chart = Chart::new(NullRenderer::default(), config).expect("chart init");
    chart.set_bars(&generated_bars(2_000)).expect("set bars");

    c.bench_function("chart_render_2k", |b| {
        b.iter(|| chart.render().expect("render should succeed"))
    });
}

criterion_group!(
    benches,
    bench_projection_round_trip,
    bench_value_calibration,
    bench_price_style_conversion_10k,
    bench_chart_render_2k
);
criterion_main!(benches);
