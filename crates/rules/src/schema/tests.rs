use flowstate_core::{Aggregation, AnimationKind, Level, LinkTarget};

use super::*;

const RULE_SET_YAML: &str = r##"
apiVersion: v1
kind: FlowchartRules
metadata:
  id: datacenter
  name: Datacenter overview
  tags: [network, power]
rules:
  - id: cpu
    name: CPU load
    alias: "cpu_*"
    aggregation: avg
    thresholds:
      - { value: 50, level: 1, comparator: ">=" }
      - { value: 80, level: 2, comparator: gte }
    shape_maps:
      - pattern: "/^rack-\\d+$/"
        target: strokeColor
        when: critical
    text_maps:
      - pattern: rack-1
        template: "${_value}%"
  - id: uplink
    name: Uplink
    enabled: false
    link_maps:
      - url: "https://grafana.local/d/uplink?var-host=$host"
        link_target: _self
    event_maps:
      - animation: flow
        duration: 500
"##;

fn parse() -> RuleSet {
    serde_yaml::from_str(RULE_SET_YAML).unwrap()
}

#[test]
fn parse_full_rule_set() {
    let set = parse();
    assert_eq!(set.api_version, "v1");
    assert_eq!(set.kind, RULE_SET_KIND);
    assert_eq!(set.metadata.id, "datacenter");
    assert!(set.metadata.enabled);
    assert_eq!(set.rules.len(), 2);

    let cpu = set.rule("cpu").unwrap();
    assert_eq!(cpu.match_target(), "cpu_*");
    assert_eq!(cpu.aggregation, Aggregation::Avg);
    assert_eq!(cpu.thresholds[0].level, Level::Warning);
    assert_eq!(cpu.thresholds[1].comparator, Comparator::Gte);
    assert_eq!(cpu.thresholds[1].value, Operand::Number(80.0));
    assert_eq!(cpu.shape_maps[0].target, ColorTarget::StrokeColor);
    assert_eq!(cpu.shape_maps[0].when, MappingCondition::Critical);
    assert_eq!(cpu.text_maps[0].template, "${_value}%");
}

#[test]
fn omitted_fields_take_defaults() {
    let set = parse();
    let uplink = set.rule("uplink").unwrap();

    assert!(!uplink.enabled);
    assert_eq!(uplink.pattern, ".*");
    assert_eq!(uplink.match_target(), ".*");
    assert_eq!(uplink.unit, "short");
    assert_eq!(uplink.decimals, 2);
    assert_eq!(uplink.aggregation, Aggregation::Current);

    let link = &uplink.link_maps[0];
    assert_eq!(link.pattern, ".*");
    assert_eq!(link.link_target, LinkTarget::Current);
    assert_eq!(link.when, MappingCondition::Always);
    assert!(link.enabled);

    let event = &uplink.event_maps[0];
    assert_eq!(event.animation, AnimationKind::Flow);
    assert_eq!(event.duration, 500);

    let text = TextMap::default();
    assert_eq!(text.template, DEFAULT_TEXT_TEMPLATE);
}

#[test]
fn enabled_rules_skips_disabled() {
    let set = parse();
    let ids: Vec<&str> = set.enabled_rules().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["cpu"]);
}

#[test]
fn always_directives_detected() {
    let set = parse();
    assert!(set.rule("cpu").unwrap().has_always_directives());
    assert!(set.rule("uplink").unwrap().has_always_directives());

    let mut rule = Rule::new("r", "R");
    rule.shape_maps.push(ShapeMap {
        when: MappingCondition::Critical,
        ..ShapeMap::default()
    });
    assert!(!rule.has_always_directives());
    rule.link_maps.push(LinkMap {
        enabled: false,
        ..LinkMap::default()
    });
    assert!(!rule.has_always_directives());
}

#[test]
fn when_condition_is_total_over_levels() {
    let cases = [
        (MappingCondition::Always, [true, true, true]),
        (MappingCondition::Ok, [true, false, false]),
        (MappingCondition::Warning, [false, true, false]),
        (MappingCondition::Critical, [false, false, true]),
        (MappingCondition::Never, [false, false, false]),
    ];
    for (when, expected) in cases {
        for (level, want) in [Level::Ok, Level::Warning, Level::Critical].into_iter().zip(expected) {
            assert_eq!(when.applies(level), want, "{:?} at {:?}", when, level);
        }
    }
}

#[test]
fn string_threshold_values_are_kept() {
    let spec: ThresholdSpec =
        serde_yaml::from_str("{ value: down, level: 2, comparator: \"==\" }").unwrap();
    assert_eq!(spec.value, Operand::Text("down".to_string()));
    assert_eq!(spec.value.as_number(), None);
    assert_eq!(Operand::from("42").as_number(), Some(42.0));
}

#[test]
fn unknown_rule_field_rejected() {
    let result: Result<Rule, _> = serde_yaml::from_str("id: x\nbogus: 1\n");
    assert!(result.is_err());
}

#[test]
fn yaml_round_trip_preserves_rules() {
    let set = parse();
    let yaml = set.to_yaml().unwrap();
    let back: RuleSet = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, set);
}
