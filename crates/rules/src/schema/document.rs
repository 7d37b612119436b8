//! Rule-set document container.

use serde::{Deserialize, Serialize};

use super::{CommonMetadata, Rule};

/// The only document kind understood by the loader.
pub const RULE_SET_KIND: &str = "FlowchartRules";

/// An ordered list of rules as authored in one YAML document.
///
/// Order is significant: when two rules touch the same element, the later
/// rule wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Enabled rules, in configured order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Look up a rule by id.
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Serialize this document back to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
