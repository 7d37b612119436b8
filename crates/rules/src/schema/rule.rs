//! A single rule: metric match, evaluation, formatting, and directives.

use flowstate_core::{Aggregation, ThresholdColors};
use serde::{Deserialize, Serialize};

use super::{EventMap, LinkMap, MappingCondition, RangeMap, ShapeMap, TextMap, ThresholdSpec, ValueMap};

/// One user-authored rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub enabled: bool,

    // ── Metric matching ──
    /// Metric name pattern; used when `alias` is empty.
    pub pattern: String,
    /// Preferred metric name pattern.
    pub alias: String,
    /// Exact column / metric name filter for pivoted tables.
    pub column: String,
    pub aggregation: Aggregation,

    // ── Evaluation ──
    pub thresholds: Vec<ThresholdSpec>,
    pub invert: bool,
    pub colors: ThresholdColors,
    pub gradient: bool,
    pub gradient_colors: Vec<String>,
    pub gradient_thresholds: Vec<f64>,

    // ── Formatting ──
    pub unit: String,
    pub decimals: usize,
    pub value_maps: Vec<ValueMap>,
    pub range_maps: Vec<RangeMap>,

    // ── Directives ──
    pub shape_maps: Vec<ShapeMap>,
    pub text_maps: Vec<TextMap>,
    pub link_maps: Vec<LinkMap>,
    pub event_maps: Vec<EventMap>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            enabled: true,
            pattern: ".*".to_string(),
            alias: String::new(),
            column: String::new(),
            aggregation: Aggregation::Current,
            thresholds: Vec::new(),
            invert: false,
            colors: ThresholdColors::default(),
            gradient: false,
            gradient_colors: Vec::new(),
            gradient_thresholds: Vec::new(),
            unit: "short".to_string(),
            decimals: 2,
            value_maps: Vec::new(),
            range_maps: Vec::new(),
            shape_maps: Vec::new(),
            text_maps: Vec::new(),
            link_maps: Vec::new(),
            event_maps: Vec::new(),
        }
    }
}

impl Rule {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Metric pattern this rule matches against: `alias` when set, else `pattern`.
    pub fn match_target(&self) -> &str {
        if self.alias.is_empty() {
            &self.pattern
        } else {
            &self.alias
        }
    }

    /// Gradient evaluation is used only when enabled and fully configured.
    pub fn uses_gradient(&self) -> bool {
        self.gradient && !self.gradient_colors.is_empty() && !self.gradient_thresholds.is_empty()
    }

    /// True when any enabled directive applies regardless of data.
    pub fn has_always_directives(&self) -> bool {
        let always = |enabled: bool, when: MappingCondition| enabled && when == MappingCondition::Always;
        self.shape_maps.iter().any(|m| always(m.enabled, m.when))
            || self.text_maps.iter().any(|m| always(m.enabled, m.when))
            || self.link_maps.iter().any(|m| always(m.enabled, m.when))
            || self.event_maps.iter().any(|m| always(m.enabled, m.when))
    }
}
