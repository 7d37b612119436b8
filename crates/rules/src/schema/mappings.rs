//! Mapping directives and value/range maps.
//!
//! Every directive carries its own element pattern and an apply condition
//! (`when`) evaluated against the severity level of the owning rule.

use flowstate_core::{AnimationKind, Level, LinkTarget};
use serde::{Deserialize, Serialize};

/// Condition under which a directive applies, judged on the rule's level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingCondition {
    #[default]
    Always,
    Ok,
    Warning,
    Critical,
    Never,
}

impl MappingCondition {
    pub fn applies(self, level: Level) -> bool {
        match self {
            MappingCondition::Always => true,
            MappingCondition::Ok => level == Level::Ok,
            MappingCondition::Warning => level == Level::Warning,
            MappingCondition::Critical => level == Level::Critical,
            MappingCondition::Never => false,
        }
    }
}

/// Style slot a shape directive writes the rule colour into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTarget {
    #[default]
    #[serde(alias = "fillColor")]
    FillColor,
    #[serde(alias = "strokeColor")]
    StrokeColor,
    #[serde(alias = "fontColor")]
    FontColor,
    #[serde(alias = "bgColor")]
    BgColor,
    /// Gradient fill; written to the fill slot.
    #[serde(alias = "gradientColor")]
    GradientColor,
}

/// How a text directive combines with the existing label. `Append` and
/// `Prepend` only wrap placeholder templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextReplaceMode {
    #[default]
    Content,
    Pattern,
    Append,
    Prepend,
}

pub const DEFAULT_TEXT_TEMPLATE: &str = "${_formattedValue}";

fn default_pattern() -> String {
    ".*".to_string()
}

/// Colour and visibility directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeMap {
    pub pattern: String,
    pub hidden: bool,
    pub target: ColorTarget,
    pub when: MappingCondition,
    pub enabled: bool,
}

impl Default for ShapeMap {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            hidden: false,
            target: ColorTarget::FillColor,
            when: MappingCondition::Always,
            enabled: true,
        }
    }
}

/// Label rewrite directive.
///
/// `template` is either a placeholder template (`${_value} ms`) or a regex
/// substitution on the original label (`/pattern/flags[suffix]`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TextMap {
    pub pattern: String,
    pub hidden: bool,
    pub mode: TextReplaceMode,
    pub template: String,
    pub when: MappingCondition,
    pub enabled: bool,
}

impl Default for TextMap {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            hidden: false,
            mode: TextReplaceMode::Content,
            template: DEFAULT_TEXT_TEMPLATE.to_string(),
            when: MappingCondition::Always,
            enabled: true,
        }
    }
}

/// Clickable link directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LinkMap {
    pub pattern: String,
    pub hidden: bool,
    pub url: String,
    pub link_target: LinkTarget,
    pub params: String,
    pub when: MappingCondition,
    pub enabled: bool,
}

impl Default for LinkMap {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            hidden: false,
            url: String::new(),
            link_target: LinkTarget::Blank,
            params: String::new(),
            when: MappingCondition::Always,
            enabled: true,
        }
    }
}

/// Animation directive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EventMap {
    pub pattern: String,
    pub hidden: bool,
    pub animation: AnimationKind,
    /// Milliseconds.
    pub duration: u64,
    pub when: MappingCondition,
    pub enabled: bool,
}

impl Default for EventMap {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            hidden: false,
            animation: AnimationKind::Blink,
            duration: 1000,
            when: MappingCondition::Always,
            enabled: true,
        }
    }
}

/// Exact value → display text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ValueMap {
    pub value: String,
    pub text: String,
    #[serde(default = "super::metadata::default_true")]
    pub enabled: bool,
}

/// Inclusive numeric range → display text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RangeMap {
    pub from: f64,
    pub to: f64,
    pub text: String,
    #[serde(default = "super::metadata::default_true")]
    pub enabled: bool,
}

/// Read-only view over the pieces every directive kind shares.
pub trait Directive {
    fn pattern(&self) -> &str;
    fn when(&self) -> MappingCondition;
    fn is_enabled(&self) -> bool;

    /// Enabled and allowed at `level`.
    fn is_active(&self, level: Level) -> bool {
        self.is_enabled() && self.when().applies(level)
    }
}

macro_rules! impl_directive {
    ($($ty:ty),+) => {
        $(
            impl Directive for $ty {
                fn pattern(&self) -> &str {
                    &self.pattern
                }

                fn when(&self) -> MappingCondition {
                    self.when
                }

                fn is_enabled(&self) -> bool {
                    self.enabled
                }
            }
        )+
    };
}

impl_directive!(ShapeMap, TextMap, LinkMap, EventMap);
