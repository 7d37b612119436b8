//! Reduction of a value series to one scalar.

use flowstate_core::Aggregation;

/// Reduce `values` with `kind`.
///
/// Empty input yields `0.0`. Unknown kinds reduce like `last`.
pub fn aggregate(values: &[f64], kind: &Aggregation) -> f64 {
    let (first, last) = match (values.first(), values.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return 0.0,
    };

    match kind {
        Aggregation::Current | Aggregation::Last | Aggregation::Unknown(_) => last,
        Aggregation::First => first,
        Aggregation::Min => min(values),
        Aggregation::Max => max(values),
        Aggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
        Aggregation::Sum => values.iter().sum(),
        Aggregation::Count => values.len() as f64,
        Aggregation::Delta | Aggregation::Diff => last - first,
        Aggregation::Range => max(values) - min(values),
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_core::AGGREGATION_NAMES;

    fn all_kinds() -> Vec<Aggregation> {
        let mut kinds: Vec<Aggregation> = AGGREGATION_NAMES.iter().map(|n| Aggregation::from(*n)).collect();
        kinds.push(Aggregation::Unknown("median".to_string()));
        kinds
    }

    #[test]
    fn empty_input_is_zero_for_every_kind() {
        for kind in all_kinds() {
            assert_eq!(aggregate(&[], &kind), 0.0, "{kind}");
        }
    }

    #[test]
    fn single_value_is_itself_except_count_and_spreads() {
        for kind in all_kinds() {
            let expected = match kind {
                Aggregation::Count => 1.0,
                Aggregation::Delta | Aggregation::Diff | Aggregation::Range => 0.0,
                _ => 5.0,
            };
            assert_eq!(aggregate(&[5.0], &kind), expected, "{kind}");
        }
    }

    #[test]
    fn each_kind_on_a_series() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let cases = [
            ("current", 4.0),
            ("last", 4.0),
            ("first", 1.0),
            ("min", 1.0),
            ("max", 4.0),
            ("avg", 2.5),
            ("sum", 10.0),
            ("count", 4.0),
            ("delta", 3.0),
            ("diff", 3.0),
            ("range", 3.0),
            ("bogus", 4.0),
        ];
        for (name, expected) in cases {
            assert_eq!(aggregate(&values, &Aggregation::from(name)), expected, "{name}");
        }
    }

    #[test]
    fn extremes_on_unsorted_series() {
        let values = [3.0, -2.0, 9.5, 0.0];
        assert_eq!(aggregate(&values, &Aggregation::Min), -2.0);
        assert_eq!(aggregate(&values, &Aggregation::Max), 9.5);
        assert_eq!(aggregate(&values, &Aggregation::Range), 11.5);
        assert_eq!(aggregate(&values, &Aggregation::Delta), -3.0);
    }
}
