//! Per-rule checks: ids, patterns, evaluation settings, formatting, links.

use std::collections::HashSet;

use flowstate_core::{Aggregation, AGGREGATION_NAMES};

use crate::pattern::{build_regex, split_regex_literal};
use crate::schema::{Comparator, Directive, Operand, Rule, RuleSet};
use crate::threshold::Rgb;

use super::fuzzy::{fuzzy_match, is_kebab_case};
use super::ValidationResult;

pub(crate) fn validate_metadata(set: &RuleSet, result: &mut ValidationResult) {
    if !is_kebab_case(&set.metadata.id) {
        result.warn(
            "metadata.id",
            format!("rule set id '{}' should be kebab-case", set.metadata.id),
        );
    }
}

pub(crate) fn validate_rule_ids(set: &RuleSet, result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for (i, rule) in set.rules.iter().enumerate() {
        let path = format!("rules[{}].id", i);
        if rule.id.trim().is_empty() {
            result.error(path, "rule id must not be empty");
        } else if !seen.insert(rule.id.as_str()) {
            result.error(path, format!("duplicate rule id '{}'", rule.id));
        }
    }
}

/// Regex literals (`/body/flags`) must compile; anything else always does.
fn check_pattern(pattern: &str, path: String, result: &mut ValidationResult) {
    if let Some((body, flags)) = split_regex_literal(pattern) {
        if let Err(e) = build_regex(body, flags) {
            result.error(path, format!("invalid regex '{}': {}", pattern, e));
        }
    }
}

pub(crate) fn validate_patterns(rule: &Rule, path: &str, result: &mut ValidationResult) {
    check_pattern(&rule.pattern, format!("{}.pattern", path), result);
    check_pattern(&rule.alias, format!("{}.alias", path), result);

    fn each<D: Directive>(maps: &[D], kind: &str, path: &str, result: &mut ValidationResult) {
        for (j, map) in maps.iter().enumerate() {
            check_pattern(map.pattern(), format!("{}.{}[{}].pattern", path, kind, j), result);
        }
    }
    each(&rule.shape_maps, "shape_maps", path, result);
    each(&rule.text_maps, "text_maps", path, result);
    each(&rule.link_maps, "link_maps", path, result);
    each(&rule.event_maps, "event_maps", path, result);
}

pub(crate) fn validate_evaluation(rule: &Rule, path: &str, result: &mut ValidationResult) {
    if let Aggregation::Unknown(name) = &rule.aggregation {
        let suggestion = fuzzy_match(name, AGGREGATION_NAMES);
        result.warn_with_suggestion(
            format!("{}.aggregation", path),
            format!("unknown aggregation '{}', the last value will be used", name),
            suggestion,
        );
    }

    for (j, threshold) in rule.thresholds.iter().enumerate() {
        let ordering = !matches!(threshold.comparator, Comparator::Eq | Comparator::Neq);
        if ordering && threshold.value.as_number().is_none() {
            let Operand::Text(text) = &threshold.value else { continue };
            result.warn(
                format!("{}.thresholds[{}]", path, j),
                format!(
                    "non-numeric value '{}' with comparator '{}' never matches",
                    text, threshold.comparator
                ),
            );
        }
    }

    if rule.gradient {
        if rule.gradient_thresholds.is_empty() {
            result.warn(
                format!("{}.gradient_thresholds", path),
                "gradient is enabled without thresholds, discrete thresholds are used instead",
            );
        }
        if rule.gradient_colors.is_empty() {
            result.warn(
                format!("{}.gradient_colors", path),
                "gradient is enabled without colors, discrete thresholds are used instead",
            );
        }
    }
    for (j, color) in rule.gradient_colors.iter().enumerate() {
        if let Err(e) = color.parse::<Rgb>() {
            result.warn(
                format!("{}.gradient_colors[{}]", path, j),
                format!("{}; interpolation falls back to a hard switch", e),
            );
        }
    }
}

pub(crate) fn validate_formatting(rule: &Rule, path: &str, result: &mut ValidationResult) {
    for (j, range) in rule.range_maps.iter().enumerate() {
        if range.from > range.to {
            result.warn(
                format!("{}.range_maps[{}]", path, j),
                format!("range {}..{} is empty", range.from, range.to),
            );
        }
    }
}

pub(crate) fn validate_links(rule: &Rule, path: &str, result: &mut ValidationResult) {
    for (j, link) in rule.link_maps.iter().enumerate() {
        if link.url.trim().is_empty() {
            result.warn(format!("{}.link_maps[{}].url", path, j), "link has no url");
        }
    }
}
