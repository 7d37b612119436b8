//! Placeholder templates, host-variable injection, and value formatting.
//!
//! Templates reference variables as `${name}` or bare `$name`. Placeholders
//! without a value are left in place. Text directives additionally accept a
//! regex-substitution form, see [`resolve_text_template`].

mod format;

pub use format::*;

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use flowstate_core::{ElementState, Level};
use indexmap::IndexMap;
use regex::{NoExpand, Regex};

use crate::pattern::build_regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder regex is valid")
});

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("braced placeholder regex is valid"));

static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("bare placeholder regex is valid"));

/// `/body/flags[suffix]`: a text template that rewrites the original label.
static TEXT_REGEX_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^/(.+?)/([gimsuy]*)(.*)$").expect("text template regex is valid"));

// ── Host variables ──────────────────────────────────────────────────

/// Host-level variable substitution (dashboard variables and the like),
/// applied to metric targets, column filters and link URLs before anything
/// else looks at them.
pub trait HostVariables {
    fn resolve(&self, text: &str) -> String;
}

impl<F> HostVariables for F
where
    F: Fn(&str) -> String,
{
    fn resolve(&self, text: &str) -> String {
        self(text)
    }
}

/// Host without variables: text passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostVariables;

impl HostVariables for NoHostVariables {
    fn resolve(&self, text: &str) -> String {
        text.to_string()
    }
}

// ── Variable values ─────────────────────────────────────────────────

/// A value bound to a template variable.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Date(DateTime<Utc>),
    List(Vec<VarValue>),
    Object(serde_json::Value),
    /// Bound but empty; the placeholder stays unresolved.
    Null,
}

impl VarValue {
    /// Display form used in templates, `None` for [`VarValue::Null`].
    ///
    /// Whole numbers print without a fraction, other numbers with two
    /// decimals; dates are ISO-8601 in UTC; lists are comma-joined.
    pub fn render(&self) -> Option<String> {
        let s = match self {
            VarValue::Number(n) if n.is_finite() && n.fract() == 0.0 => js_number_string(*n),
            VarValue::Number(n) if n.is_finite() => to_fixed(*n, 2),
            VarValue::Number(n) => js_number_string(*n),
            VarValue::Text(s) => s.clone(),
            VarValue::Bool(b) => b.to_string(),
            VarValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            VarValue::List(items) => items
                .iter()
                .map(|v| v.render().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", "),
            VarValue::Object(v) => v.to_string(),
            VarValue::Null => return None,
        };
        Some(s)
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().unwrap_or_default())
    }
}

impl From<f64> for VarValue {
    fn from(n: f64) -> Self {
        VarValue::Number(n)
    }
}

impl From<i64> for VarValue {
    fn from(n: i64) -> Self {
        VarValue::Number(n as f64)
    }
}

impl From<u8> for VarValue {
    fn from(n: u8) -> Self {
        VarValue::Number(n as f64)
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Text(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Text(s)
    }
}

impl From<DateTime<Utc>> for VarValue {
    fn from(d: DateTime<Utc>) -> Self {
        VarValue::Date(d)
    }
}

impl From<Vec<VarValue>> for VarValue {
    fn from(items: Vec<VarValue>) -> Self {
        VarValue::List(items)
    }
}

impl From<serde_json::Value> for VarValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => VarValue::Null,
            serde_json::Value::Bool(b) => VarValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(VarValue::Number).unwrap_or(VarValue::Null),
            serde_json::Value::String(s) => VarValue::Text(s),
            serde_json::Value::Array(items) => VarValue::List(items.into_iter().map(VarValue::from).collect()),
            other => VarValue::Object(other),
        }
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Named variables available to a template, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableContext {
    vars: IndexMap<String, VarValue>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<VarValue>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for VariableContext
where
    K: Into<String>,
    V: Into<VarValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = VariableContext::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

/// A plain variable context doubles as a host resolver.
impl HostVariables for VariableContext {
    fn resolve(&self, text: &str) -> String {
        resolve(text, self)
    }
}

/// Element variables for templates, taken from its current state:
/// `_value`, `_label`, `_alias`, `_rule`, `_level`, `_color`, `_formattedValue`.
pub fn context_for(state: &ElementState) -> VariableContext {
    let formatted = if state.formatted_value.is_empty() {
        js_number_string(state.value)
    } else {
        state.formatted_value.clone()
    };

    VariableContext::new()
        .with("_value", state.value)
        .with("_label", state.element_id.as_str())
        .with("_alias", state.rule_name.as_str())
        .with("_rule", state.rule_name.as_str())
        .with("_level", state.level.code())
        .with("_color", state.color.as_str())
        .with("_formattedValue", formatted)
}

// ── Resolution ──────────────────────────────────────────────────────

/// Substitute `${name}` and `$name` placeholders in one pass.
pub fn resolve(template: &str, context: &VariableContext) -> String {
    if !template.contains('$') {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()).unwrap_or_default();
            context
                .get(name)
                .and_then(VarValue::render)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolve a text directive template for one element.
///
/// A template shaped `/body/flags[suffix]` replaces regex matches in
/// `original_label` with the formatted value followed by `suffix` (every
/// match with the `g` flag, otherwise the first). A regex that does not
/// compile yields the bare formatted value. Any other template is resolved
/// against the element's variables.
pub fn resolve_text_template(template: &str, original_label: &str, state: &ElementState) -> String {
    let Some(caps) = TEXT_REGEX_TEMPLATE.captures(template) else {
        return resolve(template, &context_for(state));
    };

    let (body, flags, suffix) = (&caps[1], &caps[2], &caps[3]);
    let replacement = format!("{}{}", state.formatted_value, suffix);
    match build_regex(body, flags) {
        Ok(re) if flags.contains('g') => re.replace_all(original_label, NoExpand(&replacement)).into_owned(),
        Ok(re) => re.replace(original_label, NoExpand(&replacement)).into_owned(),
        Err(_) => state.formatted_value.clone(),
    }
}

/// True for the `/body/flags[suffix]` form, which already carries the
/// original label in its output.
pub fn is_regex_text_template(template: &str) -> bool {
    TEXT_REGEX_TEMPLATE.is_match(template)
}

/// Clickable URL for an element: host variables first, then element
/// variables.
pub fn resolve_link_url(url: &str, state: &ElementState, host: &dyn HostVariables) -> String {
    resolve(&host.resolve(url), &context_for(state))
}

/// Distinct placeholder names in `text`: braced forms first, then bare ones,
/// each in order of first appearance.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let found = BRACED
        .captures_iter(text)
        .chain(BARE.captures_iter(text))
        .map(|c| c[1].to_string());
    for name in found {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn level_name(level: Level) -> &'static str {
    level.name()
}
