use crate::render::TextHAlign;

use super::format::{CustomDateFormat, DateGranularity, TimeIntervalDateFormat};
use super::{AutoDateCalibratorOptions, DateCalibrationInput, FixedDateCalibratorOptions, MajorDateTick};

/// Walks records left to right and labels every record whose date text
/// changes, skipping records whose label would overlap the previous one.
pub(super) fn calibrate_auto(
    options: &AutoDateCalibratorOptions,
    input: &DateCalibrationInput<'_>,
    ticks: &mut Vec<MajorDateTick>,
) {
    let projection = &input.projection;
    let Ok(formatter) = TimeIntervalDateFormat::new(projection.time_interval()) else {
        return;
    };
    let frame = projection.frame();
    let min_text_x = input.text_bounds.left;
    let max_text_x = input.text_bounds.right();
    let max_x = input.max_x;

    let mut record = projection.record_by_column(0.0, true) as i64;
    let mut prev_date: Option<i64> = None;
    let mut prev_text: Option<String> = None;
    let mut prev_label_right = f64::NEG_INFINITY;

    while (record as f64) <= input.max_allowed_record {
        let x = projection.x_by_record_centered(record as f64);
        if x >= max_x {
            break;
        }
        let date = projection.date_by_record(record);
        let Some(text) = formatter.label_since(date, prev_date) else {
            record += 1;
            continue;
        };
        if prev_text.as_deref() == Some(text.as_str()) || x < frame.left {
            record += 1;
            continue;
        }

        let text_width = input.metrics.text_width(&text);
        let mut text_start = x - text_width / 2.0;
        let next_x = if text_start < prev_label_right {
            prev_label_right + text_width / 2.0
        } else {
            let (text_x, text_align) = if text_start < min_text_x {
                text_start = min_text_x;
                (min_text_x, TextHAlign::Left)
            } else if text_start + text_width > max_text_x {
                text_start = max_text_x - text_width;
                (max_text_x, TextHAlign::Right)
            } else {
                (x, TextHAlign::Center)
            };

            ticks.push(MajorDateTick {
                x,
                date_ms: date,
                text_x,
                text_align,
                text: text.clone(),
            });

            prev_label_right = text_start + text_width + options.min_labels_offset;
            prev_date = Some(date);
            prev_text = Some(text);
            prev_label_right.ceil()
        };

        if next_x > max_x {
            break;
        }
        let next_record = projection.record_index_by_x(next_x) + 1;
        record = if next_record > record { next_record } else { record + 1 };
    }
}

/// Exactly `labels_count` labels spread evenly across the padded frame.
pub(super) fn calibrate_fixed(
    options: &FixedDateCalibratorOptions,
    input: &DateCalibrationInput<'_>,
    ticks: &mut Vec<MajorDateTick>,
) {
    let count = options.labels_count;
    if count == 0 {
        return;
    }
    let projection = &input.projection;
    let frame = projection.frame();
    let start_x = frame.left - input.panel_padding.left;
    let end_x = frame.right() + input.panel_padding.right;
    let min_text_x = input.text_bounds.left;
    let max_text_x = input.text_bounds.right();

    let granularity = DateGranularity::from_time_interval(projection.time_interval());
    let other = options
        .format
        .other
        .clone()
        .unwrap_or_else(|| CustomDateFormat::new(granularity.fixed_label_pattern()));
    let first = options.format.first.as_ref().unwrap_or(&other);
    let last = options.format.last.as_ref().unwrap_or(&other);

    let step = if count > 1 {
        (end_x - start_x) / f64::from(count - 1)
    } else {
        0.0
    };
    for i in 0..count {
        let x = if count > 1 {
            start_x + f64::from(i) * step
        } else {
            (start_x + end_x) / 2.0
        };
        let format = if i + 1 == count {
            last
        } else if i == 0 {
            first
        } else {
            &other
        };

        let date = projection.date_by_x(x);
        let text = format.format(date);
        let half_width = input.metrics.text_width(&text) / 2.0;
        let (text_x, text_align) = if x - half_width < min_text_x {
            (min_text_x, TextHAlign::Left)
        } else if x + half_width > max_text_x {
            (max_text_x, TextHAlign::Right)
        } else {
            (x, TextHAlign::Center)
        };

        ticks.push(MajorDateTick {
            x,
            date_ms: date,
            text_x,
            text_align,
            text,
        });
    }
}
