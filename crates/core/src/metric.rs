//! Numeric series extracted from input frames.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reduction applied to a series of values to obtain one scalar.
///
/// Names that are not recognised are kept as [`Aggregation::Unknown`] and
/// reduce like `last`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregation {
    #[default]
    Current,
    Last,
    First,
    Min,
    Max,
    Avg,
    Sum,
    Count,
    Delta,
    Diff,
    Range,
    Unknown(String),
}

/// Every recognised aggregation name, in display order.
pub const AGGREGATION_NAMES: &[&str] = &[
    "current", "min", "max", "avg", "sum", "count", "delta", "diff", "range", "first", "last",
];

impl Aggregation {
    pub fn as_str(&self) -> &str {
        match self {
            Aggregation::Current => "current",
            Aggregation::Last => "last",
            Aggregation::First => "first",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Avg => "avg",
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Delta => "delta",
            Aggregation::Diff => "diff",
            Aggregation::Range => "range",
            Aggregation::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Aggregation::Unknown(_))
    }
}

impl From<&str> for Aggregation {
    fn from(name: &str) -> Self {
        match name {
            "current" => Aggregation::Current,
            "last" => Aggregation::Last,
            "first" => Aggregation::First,
            "min" => Aggregation::Min,
            "max" => Aggregation::Max,
            "avg" => Aggregation::Avg,
            "sum" => Aggregation::Sum,
            "count" => Aggregation::Count,
            "delta" => Aggregation::Delta,
            "diff" => Aggregation::Diff,
            "range" => Aggregation::Range,
            other => Aggregation::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Aggregation {
    fn from(name: String) -> Self {
        Aggregation::from(name.as_str())
    }
}

impl From<Aggregation> for String {
    fn from(aggregation: Aggregation) -> Self {
        aggregation.as_str().to_string()
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One numeric series extracted from an input frame.
///
/// `values` holds only finite numbers. `timestamps` is either empty or has
/// exactly one entry per value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMetric {
    /// Display and match key.
    pub name: String,
    /// Query / row id of the originating frame.
    pub source_id: String,
    pub values: Vec<f64>,
    pub timestamps: Vec<f64>,
    pub last_value: f64,
    /// Value reduced under `aggregation`.
    pub aggregated_value: f64,
    pub aggregation: Aggregation,
    /// Name of the field the values came from.
    pub field_name: String,
    /// Discriminating column value for pivoted input (e.g. a device id).
    pub column_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_aggregation_keeps_its_name() {
        let agg: Aggregation = serde_json::from_str("\"median\"").unwrap();
        assert_eq!(agg, Aggregation::Unknown("median".to_string()));
        assert!(!agg.is_known());
        assert_eq!(serde_json::to_string(&agg).unwrap(), "\"median\"");
    }

    #[test]
    fn known_names_round_through_display() {
        for name in AGGREGATION_NAMES {
            let agg = Aggregation::from(*name);
            assert!(agg.is_known(), "{name} should be recognised");
            assert_eq!(agg.to_string(), *name);
        }
    }
}
