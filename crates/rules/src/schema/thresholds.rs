//! Threshold specifications and comparison operators.

use std::fmt;

use flowstate_core::Level;
use serde::{Deserialize, Serialize};

/// Comparison applied between the evaluated value and a threshold value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = ">=", alias = "gte")]
    Gte,
    #[serde(rename = "<=", alias = "lte")]
    Lte,
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "neq")]
    Neq,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
            Comparator::Eq => "==",
            Comparator::Neq => "!=",
        };
        f.write_str(s)
    }
}

/// A comparison operand: numeric in the common case, text when the
/// configuration carries a non-numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Number(f64),
    Text(String),
}

impl Operand {
    /// Numeric reading of the operand, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) if !n.is_nan() => Some(*n),
            Operand::Number(_) => None,
            Operand::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        }
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Number(n)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Text(s.to_string())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Text(s) => f.write_str(s),
        }
    }
}

/// One discrete threshold: when `value <comparator> threshold` holds, the
/// rule reaches `level`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSpec {
    pub value: Operand,
    pub level: Level,
    #[serde(default = "default_comparator")]
    pub comparator: Comparator,
}

impl ThresholdSpec {
    pub fn new(value: impl Into<Operand>, level: Level, comparator: Comparator) -> Self {
        Self {
            value: value.into(),
            level,
            comparator,
        }
    }
}

fn default_comparator() -> Comparator {
    Comparator::Gte
}
