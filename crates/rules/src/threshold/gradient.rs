//! Continuous colour evaluation across ordered breakpoints.

use flowstate_core::{Level, DEFAULT_OK_COLOR};

use super::{interpolate_color, ThresholdResult};

/// Evaluate `value` against gradient breakpoints.
///
/// At or below the lowest breakpoint the result is level ok with the first
/// colour; at or above the highest it is critical with the last colour
/// (`invert` swaps which end colour is used). Interior values interpolate
/// between the two colours adjacent to their segment. Their level comes from
/// the value's position across the whole span, in thirds, regardless of
/// which segment it falls in.
pub fn evaluate_gradient(value: f64, thresholds: &[f64], colors: &[String], invert: bool) -> ThresholdResult {
    let (first, last) = match (colors.first(), colors.last()) {
        (Some(first), Some(last)) if !thresholds.is_empty() => (first, last),
        _ => {
            let color = colors.first().map(String::as_str).unwrap_or(DEFAULT_OK_COLOR);
            return ThresholdResult::new(Level::Ok, color);
        }
    };

    let mut sorted = thresholds.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);

    if value <= lo {
        return ThresholdResult::new(Level::Ok, (if invert { last } else { first }).clone());
    }
    if value >= hi {
        return ThresholdResult::new(Level::Critical, (if invert { first } else { last }).clone());
    }

    let Some(i) = sorted.windows(2).position(|w| value >= w[0] && value <= w[1]) else {
        return ThresholdResult::new(Level::Ok, first.clone());
    };
    let (start, end) = (sorted[i], sorted[i + 1]);
    let width = end - start;
    let progress = if width > 0.0 { (value - start) / width } else { 0.0 };

    let n = colors.len() as isize;
    let pick = |idx: isize| &colors[idx.clamp(0, n - 1) as usize];
    let i = i as isize;
    let (from, to) = if invert {
        (pick(n - 1 - i), pick(n - 2 - i))
    } else {
        (pick(i), pick(i + 1))
    };
    let color = interpolate_color(from, to, if invert { 1.0 - progress } else { progress });

    let position = (value - lo) / (hi - lo);
    let level = if position < 0.33 {
        Level::Ok
    } else if position < 0.66 {
        Level::Warning
    } else {
        Level::Critical
    };

    ThresholdResult::new(level, color)
}
