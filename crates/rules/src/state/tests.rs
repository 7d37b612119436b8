use flowstate_core::{AnimationKind, Level, LinkTarget, ThresholdColors};
use indexmap::IndexMap;

use super::*;
use crate::schema::Rule;

fn rules(yaml: &str) -> Vec<Rule> {
    serde_yaml::from_str(yaml).unwrap()
}

fn result(rule_id: &str, level: Level, color: &str, formatted: &str) -> RuleResult {
    RuleResult {
        rule_id: rule_id.to_string(),
        rule_name: rule_id.to_uppercase(),
        value: 42.0,
        level,
        color: color.to_string(),
        formatted_value: formatted.to_string(),
        matched: true,
        metric_name: "m".to_string(),
    }
}

fn elements(pairs: &[(&str, &str)]) -> (Vec<String>, IndexMap<String, String>) {
    let ids = pairs.iter().map(|(id, _)| id.to_string()).collect();
    let labels = pairs
        .iter()
        .filter(|(_, label)| !label.is_empty())
        .map(|(id, label)| (id.to_string(), label.to_string()))
        .collect();
    (ids, labels)
}

fn compute(rules: &[Rule], results: &[RuleResult], pairs: &[(&str, &str)]) -> IndexMap<String, ElementState> {
    let (ids, labels) = elements(pairs);
    compute_states(rules, results, &ids, &labels, &mut PatternCache::new())
}

#[test]
fn later_rule_wins_on_shared_element() {
    let rules = rules(
        r#"
- id: first
  shape_maps: [{ pattern: E1 }]
- id: second
  shape_maps: [{ pattern: E1 }]
"#,
    );
    let results = vec![
        result("first", Level::Ok, "#00ff00", "1"),
        result("second", Level::Critical, "#ff0000", "2"),
    ];

    let states = compute(&rules, &results, &[("E1", "")]);
    let e1 = &states["E1"];
    assert_eq!(e1.rule_id, "second");
    assert_eq!(e1.level, Level::Critical);
    assert_eq!(e1.shape.as_ref().unwrap().fill_color.as_deref(), Some("#ff0000"));
}

#[test]
fn default_directive_pattern_touches_every_element() {
    let rules = rules("- id: all\n  shape_maps: [{}]\n  text_maps: [{}]\n");
    let results = vec![result("all", Level::Warning, "#f2cc0c", "61")];

    let states = compute(&rules, &results, &[("n1", "cpu"), ("n2", "")]);
    assert_eq!(states.len(), 2);
    for id in ["n1", "n2"] {
        assert_eq!(states[id].shape.as_ref().unwrap().fill_color.as_deref(), Some("#f2cc0c"));
        assert_eq!(states[id].text.as_ref().unwrap().value.as_deref(), Some("61"));
    }
}

#[test]
fn shape_record_merges_targets_across_rules() {
    let rules = rules(
        r#"
- id: fill
  shape_maps: [{ pattern: n1, target: fill_color }]
- id: stroke
  shape_maps: [{ pattern: n1, target: strokeColor, hidden: true }]
"#,
    );
    let results = vec![
        result("fill", Level::Ok, "#111111", ""),
        result("stroke", Level::Warning, "#222222", ""),
    ];

    let states = compute(&rules, &results, &[("n1", "")]);
    let shape = states["n1"].shape.clone().unwrap();
    assert_eq!(shape.fill_color.as_deref(), Some("#111111"));
    assert_eq!(shape.stroke_color.as_deref(), Some("#222222"));
    assert!(!shape.visible);
    assert!(states["n1"].is_hidden());
}

#[test]
fn gradient_target_writes_fill() {
    let rules = rules("- id: g\n  shape_maps: [{ target: gradient_color }]\n");
    let states = compute(&rules, &[result("g", Level::Ok, "#abcdef", "")], &[("a", "")]);
    assert_eq!(states["a"].shape.as_ref().unwrap().fill_color.as_deref(), Some("#abcdef"));
}

#[test]
fn always_directives_apply_without_data() {
    let rules = rules(
        r#"
- id: docs
  alias: nothing-matches
  link_maps:
    - pattern: btn
      url: "https://wiki.local/runbook"
      link_target: _self
  shape_maps:
    - pattern: btn
      when: critical
"#,
    );

    let states = compute(&rules, &[], &[("btn", "Runbook"), ("other", "")]);
    assert_eq!(states.len(), 1);
    let btn = &states["btn"];
    assert!(!btn.matched);
    assert_eq!(btn.level, Level::Ok);
    assert_eq!(btn.color, ThresholdColors::default().ok);
    assert_eq!(btn.formatted_value, "");
    let link = btn.link.as_ref().unwrap();
    assert_eq!(link.url, "https://wiki.local/runbook");
    assert_eq!(link.target, LinkTarget::Current);
    assert!(btn.shape.is_none());
}

#[test]
fn rules_without_result_or_always_directives_are_skipped() {
    let rules = rules("- id: quiet\n  shape_maps: [{ when: warning }]\n");
    assert!(compute(&rules, &[], &[("a", "")]).is_empty());
}

#[test]
fn disabled_rules_and_directives_are_ignored() {
    let rules = rules(
        r#"
- id: off
  enabled: false
  shape_maps: [{ pattern: a }]
- id: on
  shape_maps: [{ pattern: a, enabled: false }]
  event_maps: [{ pattern: b, animation: pulse, duration: 250 }]
"#,
    );
    let results = vec![result("off", Level::Ok, "#000", ""), result("on", Level::Ok, "#fff", "")];

    let states = compute(&rules, &results, &[("a", ""), ("b", "")]);
    assert!(!states.contains_key("a"));
    let event = states["b"].event.clone().unwrap();
    assert_eq!(event.animation, AnimationKind::Pulse);
    assert_eq!(event.duration, 250);
    assert!(event.active);
}

#[test]
fn when_conditions_follow_level() {
    let rules = rules(
        r#"
- id: r
  shape_maps:
    - { pattern: ok, when: ok }
    - { pattern: warn, when: warning }
    - { pattern: crit, when: critical }
    - { pattern: never, when: never }
"#,
    );
    let pairs = [("ok", ""), ("warn", ""), ("crit", ""), ("never", "")];

    let states = compute(&rules, &[result("r", Level::Warning, "#f80", "")], &pairs);
    let touched: Vec<&str> = states.keys().map(String::as_str).collect();
    assert_eq!(touched, vec!["warn"]);
}

#[test]
fn elements_match_by_id_or_label() {
    let rules = rules("- id: r\n  shape_maps: [{ pattern: \"cpu*\" }]\n");
    let states = compute(
        &rules,
        &[result("r", Level::Ok, "#0f0", "")],
        &[("cell-1", "cpu load"), ("cpu-2", ""), ("cell-3", "memory")],
    );
    let touched: Vec<&str> = states.keys().map(String::as_str).collect();
    assert_eq!(touched, vec!["cell-1", "cpu-2"]);
}

#[test]
fn text_directives_resolve_templates() {
    let rules = rules(
        r#"
- id: t
  text_maps:
    - { pattern: plain, template: "${_rule}: $_formattedValue" }
    - { pattern: regex, template: "/\\d+/ kW" }
    - { pattern: append, mode: append, template: " ($_level)" }
    - { pattern: fallback, template: "" }
    - { pattern: whole, mode: append, template: "/.*/" }
    - { pattern: unit, mode: prepend, template: "/\\d+/ kW" }
"#,
    );
    let pairs = [
        ("plain", "Load"),
        ("regex", "Pump 12"),
        ("append", "Fan"),
        ("fallback", ""),
        ("whole", "Chiller"),
        ("unit", "Pump 7"),
    ];

    let states = compute(&rules, &[result("t", Level::Warning, "#f80", "3.5")], &pairs);
    let text = |id: &str| states[id].text.clone().unwrap();
    assert_eq!(text("plain").value.as_deref(), Some("T: 3.5"));
    assert_eq!(text("plain").original_value.as_deref(), Some("Load"));
    assert_eq!(text("regex").value.as_deref(), Some("Pump 3.5 kW"));
    assert_eq!(text("append").value.as_deref(), Some("Fan (1)"));
    assert_eq!(text("fallback").value.as_deref(), Some("3.5"));
    assert_eq!(text("fallback").original_value, None);
    assert_eq!(text("whole").value.as_deref(), Some("3.5"));
    assert_eq!(text("unit").value.as_deref(), Some("Pump 3.5 kW"));
}

#[test]
fn link_is_replaced_wholesale() {
    let rules = rules(
        r#"
- id: a
  link_maps: [{ pattern: n, url: "/a", params: "x=1" }]
- id: b
  link_maps: [{ pattern: n, url: "/b" }]
"#,
    );
    let results = vec![result("a", Level::Ok, "#000", ""), result("b", Level::Ok, "#000", "")];

    let link = compute(&rules, &results, &[("n", "")])["n"].link.clone().unwrap();
    assert_eq!(link.url, "/b");
    assert_eq!(link.params, "");
    assert_eq!(link.target, LinkTarget::Blank);
}

#[test]
fn tooltip_is_created_on_first_touch() {
    let rules = rules("- id: a\n  shape_maps: [{}]\n- id: b\n  shape_maps: [{}]\n");
    let mut second = result("b", Level::Ok, "#000", "later");
    second.metric_name = "other".into();
    let results = vec![result("a", Level::Ok, "#000", "first"), second];

    let tooltip = compute(&rules, &results, &[("n", "")])["n"].tooltip.clone().unwrap();
    assert_eq!(tooltip.metric_name, "m");
    assert_eq!(tooltip.value, "first");
}

#[test]
fn untouched_elements_are_absent() {
    let rules = rules("- id: r\n  shape_maps: [{ pattern: only }]\n");
    let states = compute(&rules, &[result("r", Level::Ok, "#000", "")], &[("only", ""), ("skip", "")]);
    assert_eq!(states.len(), 1);
    assert!(!states.contains_key("skip"));
}

#[test]
fn recomputation_is_deterministic_except_timestamp() {
    let rules = rules(
        r#"
- id: r
  shape_maps: [{ pattern: "/^n/" }]
  text_maps: [{ pattern: n1 }]
  event_maps: [{ pattern: n2, when: critical }]
"#,
    );
    let results = vec![result("r", Level::Critical, "#f00", "9")];
    let pairs = [("n1", "a"), ("n2", "b")];

    let mut first = compute(&rules, &results, &pairs);
    let mut second = compute(&rules, &results, &pairs);
    let stamp = chrono::Utc::now();
    for state in first.values_mut().chain(second.values_mut()) {
        state.timestamp = stamp;
    }
    assert_eq!(first, second);
}
