//! Advisory validation of rule sets with structured errors and suggestions.
//!
//! The engine itself tolerates every problem reported here (bad patterns
//! never match, bad colours cut over). Validation exists so authors find
//! out before a diagram silently stays grey. Errors mark a rule set as
//! invalid; warnings are informational.

pub(crate) mod fuzzy;
mod rule_checks;

use serde::{Deserialize, Serialize};

use crate::schema::RuleSet;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A problem that makes part of the rule set unusable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location such as `rules[2].shape_maps[0].pattern`.
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A suspicious but usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
    /// "Did you mean …?" candidate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn warn_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<&str>,
    ) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
            suggestion: suggestion.map(str::to_string),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed rule set.
pub fn validate_rule_set(set: &RuleSet) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_metadata(set, &mut result);
    rule_checks::validate_rule_ids(set, &mut result);
    for (i, rule) in set.rules.iter().enumerate() {
        let path = format!("rules[{}]", i);
        rule_checks::validate_patterns(rule, &path, &mut result);
        rule_checks::validate_evaluation(rule, &path, &mut result);
        rule_checks::validate_formatting(rule, &path, &mut result);
        rule_checks::validate_links(rule, &path, &mut result);
    }
    result
}
