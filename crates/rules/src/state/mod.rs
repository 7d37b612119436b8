//! Per-element state computation.
//!
//! Rules are applied in configured order into one accumulator keyed by
//! element id. Every directive touch goes through [`StateAccumulator::merge`]:
//! the element's scalar fields are overwritten by the contributing rule, then
//! the directive writes its own sub-record. Later rules therefore win on any
//! element they share with earlier ones.

mod directives;

use std::collections::HashMap;

use chrono::Utc;
use flowstate_core::{ElementState, Level, TooltipState};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::evaluator::RuleResult;
use crate::pattern::PatternCache;
use crate::schema::{Directive, Rule};

use directives::{label_of, match_elements, Contribution};

// ── Accumulator ─────────────────────────────────────────────────────

/// Element states under construction for one computation pass.
#[derive(Debug, Default)]
struct StateAccumulator {
    states: IndexMap<String, ElementState>,
}

impl StateAccumulator {
    fn len(&self) -> usize {
        self.states.len()
    }

    /// Fold one directive contribution from `result` into an element.
    fn merge(&mut self, element_id: &str, result: &RuleResult, contribution: Contribution<'_>) {
        let state = self
            .states
            .entry(element_id.to_string())
            .or_insert_with(|| ElementState {
                element_id: element_id.to_string(),
                rule_id: String::new(),
                rule_name: String::new(),
                level: Level::Ok,
                value: 0.0,
                formatted_value: String::new(),
                color: String::new(),
                matched: false,
                timestamp: Utc::now(),
                shape: None,
                text: None,
                link: None,
                tooltip: Some(TooltipState {
                    content: String::new(),
                    metric_name: result.metric_name.clone(),
                    value: result.formatted_value.clone(),
                }),
                event: None,
            });

        state.rule_id.clone_from(&result.rule_id);
        state.rule_name.clone_from(&result.rule_name);
        state.level = result.level;
        state.value = result.value;
        state.formatted_value.clone_from(&result.formatted_value);
        state.color.clone_from(&result.color);
        state.matched = result.matched;
        state.timestamp = Utc::now();

        contribution.apply_to(state);
    }

    fn into_states(self) -> IndexMap<String, ElementState> {
        self.states
    }
}

// ── Computation ─────────────────────────────────────────────────────

/// Compute the state of every element touched by at least one directive.
///
/// `results` are looked up by rule id. An enabled rule without a result is
/// skipped unless it has an enabled `always` directive, in which case it is
/// applied with a no-data placeholder result. Elements no directive touches
/// are absent from the map.
pub fn compute_states(
    rules: &[Rule],
    results: &[RuleResult],
    element_ids: &[String],
    element_labels: &IndexMap<String, String>,
    cache: &mut PatternCache,
) -> IndexMap<String, ElementState> {
    let by_rule: HashMap<&str, &RuleResult> = results.iter().map(|r| (r.rule_id.as_str(), r)).collect();
    let mut acc = StateAccumulator::default();

    for rule in rules.iter().filter(|r| r.enabled) {
        let placeholder;
        let result = match by_rule.get(rule.id.as_str()) {
            Some(result) => *result,
            None if rule.has_always_directives() => {
                debug!(rule_id = %rule.id, "no metric data, applying always directives");
                placeholder = RuleResult::no_data(rule);
                &placeholder
            }
            None => {
                debug!(rule_id = %rule.id, "no result for rule");
                continue;
            }
        };
        let level = result.level;
        let before = acc.len();

        for map in rule.shape_maps.iter().filter(|m| m.is_active(level)) {
            for id in match_elements(&map.pattern, element_ids, element_labels, cache) {
                let contribution = Contribution::Shape {
                    target: map.target,
                    hidden: map.hidden,
                };
                acc.merge(id, result, contribution);
            }
        }

        for map in rule.text_maps.iter().filter(|m| m.is_active(level)) {
            for id in match_elements(&map.pattern, element_ids, element_labels, cache) {
                let contribution = Contribution::Text {
                    template: &map.template,
                    mode: map.mode,
                    original_label: label_of(element_labels, id),
                };
                acc.merge(id, result, contribution);
            }
        }

        for map in rule.link_maps.iter().filter(|m| m.is_active(level)) {
            for id in match_elements(&map.pattern, element_ids, element_labels, cache) {
                let contribution = Contribution::Link {
                    url: &map.url,
                    target: map.link_target,
                    params: &map.params,
                };
                acc.merge(id, result, contribution);
            }
        }

        for map in rule.event_maps.iter().filter(|m| m.is_active(level)) {
            for id in match_elements(&map.pattern, element_ids, element_labels, cache) {
                let contribution = Contribution::Event {
                    animation: map.animation,
                    duration: map.duration,
                };
                acc.merge(id, result, contribution);
            }
        }

        debug!(
            rule_id = %rule.id,
            color = %result.color,
            new_states = acc.len() - before,
            total = acc.len(),
            "rule applied"
        );
    }

    info!(
        rules = rules.len(),
        results = results.len(),
        elements = element_ids.len(),
        states = acc.len(),
        "computed element states"
    );
    acc.into_states()
}

#[cfg(test)]
mod tests;
