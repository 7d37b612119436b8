//! Rule evaluation: metric selection, aggregation, severity, formatting.
//!
//! One rule against the current metrics yields at most one [`RuleResult`].
//! A rule that is disabled or matches no metric yields nothing; neither case
//! is an error.

use flowstate_core::{Level, ProcessedMetric};
use serde::Serialize;
use tracing::debug;

use crate::metrics::{aggregate, find_matching_metrics};
use crate::pattern::PatternCache;
use crate::schema::Rule;
use crate::templates::{apply_range_maps, apply_value_maps, format_value, HostVariables};
use crate::threshold::{evaluate_gradient, evaluate_threshold, ThresholdResult};

/// Outcome of one rule for one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub rule_name: String,
    pub value: f64,
    pub level: Level,
    pub color: String,
    pub formatted_value: String,
    /// False only for the placeholder result used when a rule has no data.
    pub matched: bool,
    /// Name of the first metric the rule matched.
    pub metric_name: String,
}

impl RuleResult {
    /// Placeholder for a rule without data: zero value, level ok, the rule's
    /// ok colour, empty formatted value.
    pub fn no_data(rule: &Rule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            value: 0.0,
            level: Level::Ok,
            color: rule.colors.ok.clone(),
            formatted_value: String::new(),
            matched: false,
            metric_name: String::new(),
        }
    }
}

// ── Rule evaluator ──────────────────────────────────────────────────

/// Evaluate one rule.
///
/// Values from every matched metric are concatenated in match order and
/// reduced with the rule's aggregation. Gradient evaluation is used when the
/// rule enables it and has both breakpoints and colours; otherwise discrete
/// thresholds. The formatted value comes from the first value map hit, then
/// the first range map hit, then unit formatting.
pub fn evaluate_rule(
    rule: &Rule,
    metrics: &[ProcessedMetric],
    host: &dyn HostVariables,
    cache: &mut PatternCache,
) -> Option<RuleResult> {
    if !rule.enabled {
        return None;
    }

    let matched = find_matching_metrics(metrics, rule.match_target(), &rule.column, host, cache);
    let values: Vec<f64> = matched.iter().flat_map(|m| m.values.iter().copied()).collect();
    let first = matched.first()?;
    if values.is_empty() {
        return None;
    }

    let value = aggregate(&values, &rule.aggregation);
    let ThresholdResult { level, color } = if rule.uses_gradient() {
        evaluate_gradient(value, &rule.gradient_thresholds, &rule.gradient_colors, rule.invert)
    } else {
        evaluate_threshold(value, &rule.thresholds, &rule.colors, rule.invert)
    };

    let formatted_value = apply_value_maps(value, &rule.value_maps)
        .or_else(|| apply_range_maps(value, &rule.range_maps))
        .unwrap_or_else(|| format_value(value, &rule.unit, rule.decimals));

    debug!(
        rule_id = %rule.id,
        metrics = matched.len(),
        value,
        level = %level,
        "rule evaluated"
    );

    Some(RuleResult {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        value,
        level,
        color,
        formatted_value,
        matched: true,
        metric_name: first.name.clone(),
    })
}

/// Evaluate every rule independently, keeping rule order and dropping rules
/// without a result.
pub fn evaluate_all_rules(
    rules: &[Rule],
    metrics: &[ProcessedMetric],
    host: &dyn HostVariables,
    cache: &mut PatternCache,
) -> Vec<RuleResult> {
    rules
        .iter()
        .filter_map(|rule| evaluate_rule(rule, metrics, host, cache))
        .collect()
}
