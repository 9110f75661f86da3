use super::{
    AutoValueCalibratorOptions, FixedValueCalibratorOptions, INTERVAL_EPSILON,
    IntervalValueCalibratorOptions, MajorValueTick, ValueCalibrationInput,
};
use super::format::NumberFormat;

/// One label per text line, top to bottom, skipping repeated texts.
pub(super) fn calibrate_auto(
    options: &AutoValueCalibratorOptions,
    input: &ValueCalibrationInput,
    ticks: &mut Vec<MajorValueTick>,
) {
    let text_height = input.metrics.font_size;
    let panel = input.panel_frame;
    let step = text_height + options.min_values_offset;
    if !step.is_finite() || step <= 0.0 {
        return;
    }
    let mut y = (panel.top + input.padding.top.max(input.panel_padding.top) + text_height / 2.0).round();
    let bottom = panel.bottom() - input.padding.bottom - text_height / 2.0;

    let mut prev_text: Option<String> = None;
    while y < bottom {
        let value = input.projection.value_by_y(y);
        push_if_changed(ticks, &mut prev_text, &options.number_format, y, value);
        y += step;
    }
}

/// Labels on multiples of the interval; falls back to range labels when at
/// most one multiple fits.
pub(super) fn calibrate_interval(
    options: &IntervalValueCalibratorOptions,
    input: &ValueCalibrationInput,
    ticks: &mut Vec<MajorValueTick>,
) {
    calibrate_interval_ticks(options, input, ticks);
    if ticks.len() <= 1 {
        ticks.clear();
        calibrate_range_ticks(options, input, ticks);
    }
}

fn calibrate_interval_ticks(
    options: &IntervalValueCalibratorOptions,
    input: &ValueCalibrationInput,
    ticks: &mut Vec<MajorValueTick>,
) {
    let interval = options.interval;
    let projection = &input.projection;
    if interval < INTERVAL_EPSILON || projection.max() - projection.min() <= interval {
        return;
    }

    let text_height = input.metrics.font_size;
    let panel = input.panel_frame;
    let label_offset = text_height + options.min_values_offset;
    let bottom = panel.bottom() - input.padding.bottom - text_height / 2.0;

    let mut prev_value = projection.value_by_y(panel.top);
    let mut y = (panel.top + input.padding.top + text_height / 2.0).round();
    let mut next_y = y;
    let mut prev_text: Option<String> = None;

    while y < bottom {
        let mut prev_y = next_y;
        let mut value;
        // Find the next multiple at or below the previous label's reserved area.
        loop {
            value = interval * (projection.value_by_y(y) / interval).trunc();
            if value >= prev_value {
                value = prev_value - interval;
            }
            prev_value = value;
            y = projection.y_by_value(value).round();
            if y >= next_y {
                break;
            }
            y = prev_y + 1.0;
            prev_y = y;
            if y >= bottom {
                break;
            }
        }
        next_y = y + label_offset;
        if y >= bottom {
            break;
        }

        push_if_changed(ticks, &mut prev_text, &options.number_format, y, value);
        y = next_y;
    }
}

fn calibrate_range_ticks(
    options: &IntervalValueCalibratorOptions,
    input: &ValueCalibrationInput,
    ticks: &mut Vec<MajorValueTick>,
) {
    let text_height = input.metrics.font_size;
    let half_text_height = text_height / 2.0;
    let label_offset = text_height + options.min_values_offset;
    let panel = input.panel_frame;
    let top_y = panel.top + input.padding.top + half_text_height;
    let bottom_y = panel.bottom() - input.padding.bottom - half_text_height;
    let format = &options.number_format;

    if bottom_y - top_y < label_offset {
        let mid_y = panel.top + panel.height / 2.0;
        let mid_value = input.projection.value_by_y(mid_y);
        ticks.push(MajorValueTick {
            y: mid_y,
            value: mid_value,
            text: format.format(mid_value),
        });
    } else {
        for y in [top_y, bottom_y] {
            let value = input.projection.value_by_y(y);
            ticks.push(MajorValueTick {
                y,
                value,
                text: format.format(value),
            });
        }
    }
}

/// `labels_count` labels spread evenly over the padded panel height.
pub(super) fn calibrate_fixed(
    options: &FixedValueCalibratorOptions,
    input: &ValueCalibrationInput,
    ticks: &mut Vec<MajorValueTick>,
) {
    let count = options.labels_count;
    if count == 0 {
        return;
    }
    let panel = input.panel_frame;
    let top_offset = input.padding.top.max(input.panel_padding.top);
    let height = panel.height - input.padding.bottom.max(input.panel_padding.bottom) - top_offset;
    let step = if count > 1 {
        height / f64::from(count - 1)
    } else {
        0.0
    };

    for i in 0..count {
        let offset = if count > 1 {
            f64::from(i) * step
        } else {
            height / 2.0
        };
        let y = (panel.top + top_offset + offset).round();
        let value = input.projection.value_by_y(y);
        ticks.push(MajorValueTick {
            y,
            value,
            text: options.number_format.format(value),
        });
    }
}

fn push_if_changed(
    ticks: &mut Vec<MajorValueTick>,
    prev_text: &mut Option<String>,
    format: &NumberFormat,
    y: f64,
    value: f64,
) {
    let text = format.format(value);
    if prev_text.as_deref() != Some(text.as_str()) {
        ticks.push(MajorValueTick {
            y,
            value,
            text: text.clone(),
        });
        *prev_text = Some(text);
    }
}
