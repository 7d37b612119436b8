//! Severity evaluation: discrete thresholds and continuous gradients.

mod color;
mod gradient;

pub use color::{interpolate_color, ColorParseError, Rgb};
pub use gradient::evaluate_gradient;

use flowstate_core::{Level, ThresholdColors};
use serde::Serialize;

use crate::schema::{Comparator, Operand, ThresholdSpec};

/// Severity and display colour for one evaluated value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdResult {
    pub level: Level,
    pub color: String,
}

impl ThresholdResult {
    pub fn new(level: Level, color: impl Into<String>) -> Self {
        Self {
            level,
            color: color.into(),
        }
    }
}

/// Evaluate `value` against discrete thresholds.
///
/// Thresholds are tried from the highest level down, so critical wins over
/// warning when both hold. With `invert`, a matched level is mirrored
/// (ok and critical swap) and the no-match fallback becomes critical.
/// An empty threshold list is always ok.
pub fn evaluate_threshold(
    value: f64,
    thresholds: &[ThresholdSpec],
    colors: &ThresholdColors,
    invert: bool,
) -> ThresholdResult {
    if thresholds.is_empty() {
        return ThresholdResult::new(Level::Ok, colors.ok.clone());
    }

    let mut sorted: Vec<&ThresholdSpec> = thresholds.iter().collect();
    // Stable: equal levels keep their configured order.
    sorted.sort_by(|a, b| b.level.cmp(&a.level));

    let value = Operand::Number(value);
    let level = sorted
        .iter()
        .find(|t| compare_values(&value, &t.value, t.comparator))
        .map(|t| if invert { t.level.invert() } else { t.level })
        .unwrap_or(if invert { Level::Critical } else { Level::Ok });

    ThresholdResult::new(level, color_for_level(level, colors))
}

/// Compare two operands.
///
/// Numeric when both sides read as numbers. Otherwise only `==` and `!=`
/// are defined, as text comparison; ordering comparators never hold.
pub fn compare_values(a: &Operand, b: &Operand, comparator: Comparator) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return match comparator {
            Comparator::Gt => x > y,
            Comparator::Lt => x < y,
            Comparator::Gte => x >= y,
            Comparator::Lte => x <= y,
            Comparator::Eq => x == y,
            Comparator::Neq => x != y,
        };
    }

    let (x, y) = (a.to_string(), b.to_string());
    match comparator {
        Comparator::Eq => x == y,
        Comparator::Neq => x != y,
        _ => false,
    }
}

pub fn color_for_level(level: Level, colors: &ThresholdColors) -> String {
    colors.for_level(level).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Vec<ThresholdSpec> {
        vec![
            ThresholdSpec::new(50.0, Level::Warning, Comparator::Gte),
            ThresholdSpec::new(80.0, Level::Critical, Comparator::Gte),
        ]
    }

    #[test]
    fn picks_highest_matching_level() {
        let colors = ThresholdColors::default();
        assert_eq!(evaluate_threshold(79.0, &standard(), &colors, false).level, Level::Warning);
        assert_eq!(evaluate_threshold(80.0, &standard(), &colors, false).level, Level::Critical);
        let ok = evaluate_threshold(30.0, &standard(), &colors, false);
        assert_eq!(ok.level, Level::Ok);
        assert_eq!(ok.color, colors.ok);
    }

    #[test]
    fn invert_mirrors_levels_and_fallback() {
        let colors = ThresholdColors::default();
        let low = evaluate_threshold(30.0, &standard(), &colors, true);
        assert_eq!(low.level, Level::Critical);
        assert_eq!(low.color, colors.critical);
        assert_eq!(evaluate_threshold(60.0, &standard(), &colors, true).level, Level::Warning);
        assert_eq!(evaluate_threshold(95.0, &standard(), &colors, true).level, Level::Ok);
    }

    #[test]
    fn unsorted_thresholds_are_ordered_by_level() {
        let thresholds = vec![
            ThresholdSpec::new(80.0, Level::Critical, Comparator::Gte),
            ThresholdSpec::new(10.0, Level::Ok, Comparator::Gte),
            ThresholdSpec::new(50.0, Level::Warning, Comparator::Gte),
        ];
        let r = evaluate_threshold(60.0, &thresholds, &ThresholdColors::default(), false);
        assert_eq!(r.level, Level::Warning);
    }

    #[test]
    fn empty_thresholds_are_ok_even_inverted() {
        let r = evaluate_threshold(1e9, &[], &ThresholdColors::default(), true);
        assert_eq!(r.level, Level::Ok);
    }

    #[test]
    fn text_operands_only_support_equality() {
        let up = Operand::from("up");
        assert!(compare_values(&up, &Operand::from("up"), Comparator::Eq));
        assert!(compare_values(&up, &Operand::from("down"), Comparator::Neq));
        assert!(!compare_values(&up, &Operand::from("down"), Comparator::Gt));
        assert!(!compare_values(&up, &Operand::from("up"), Comparator::Gte));
    }

    #[test]
    fn numeric_text_compares_numerically() {
        assert!(compare_values(&Operand::Number(10.0), &Operand::from(" 9.5 "), Comparator::Gt));
        assert!(compare_values(&Operand::Number(3.0), &Operand::from("3"), Comparator::Eq));
    }

    #[test]
    fn text_threshold_never_matches_numeric_value_by_order() {
        let thresholds = vec![ThresholdSpec::new("high", Level::Critical, Comparator::Gte)];
        let r = evaluate_threshold(100.0, &thresholds, &ThresholdColors::default(), false);
        assert_eq!(r.level, Level::Ok);
    }
}
