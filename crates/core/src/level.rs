//! Severity levels and the colour palette attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OK_COLOR: &str = "#73BF69";
pub const DEFAULT_WARNING_COLOR: &str = "#FF9830";
pub const DEFAULT_CRITICAL_COLOR: &str = "#F2495C";
pub const DEFAULT_NO_DATA_COLOR: &str = "#999999";

/// Severity of an evaluated value: 0 (ok), 1 (warning), 2 (critical).
///
/// Serialized as its numeric code. Codes outside `0..=2` read back as
/// [`Level::Ok`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Level {
    #[default]
    Ok,
    Warning,
    Critical,
}

impl Level {
    /// Swap ok and critical; warning stays put.
    pub fn invert(self) -> Self {
        match self {
            Level::Ok => Level::Critical,
            Level::Warning => Level::Warning,
            Level::Critical => Level::Ok,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Level::Ok => 0,
            Level::Warning => 1,
            Level::Critical => 2,
        }
    }

    /// Human-readable name: `OK`, `Warning`, `Critical`.
    pub fn name(self) -> &'static str {
        match self {
            Level::Ok => "OK",
            Level::Warning => "Warning",
            Level::Critical => "Critical",
        }
    }
}

impl From<u8> for Level {
    fn from(code: u8) -> Self {
        match code {
            1 => Level::Warning,
            2 => Level::Critical,
            _ => Level::Ok,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.code()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named colours for the three severity levels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThresholdColors {
    #[serde(default = "default_ok")]
    pub ok: String,
    #[serde(default = "default_warning")]
    pub warning: String,
    #[serde(default = "default_critical")]
    pub critical: String,
}

impl ThresholdColors {
    pub fn new(ok: impl Into<String>, warning: impl Into<String>, critical: impl Into<String>) -> Self {
        Self {
            ok: ok.into(),
            warning: warning.into(),
            critical: critical.into(),
        }
    }

    /// Colour for a severity level.
    pub fn for_level(&self, level: Level) -> &str {
        match level {
            Level::Ok => &self.ok,
            Level::Warning => &self.warning,
            Level::Critical => &self.critical,
        }
    }
}

impl Default for ThresholdColors {
    fn default() -> Self {
        Self::new(DEFAULT_OK_COLOR, DEFAULT_WARNING_COLOR, DEFAULT_CRITICAL_COLOR)
    }
}

fn default_ok() -> String {
    DEFAULT_OK_COLOR.to_string()
}

fn default_warning() -> String {
    DEFAULT_WARNING_COLOR.to_string()
}

fn default_critical() -> String {
    DEFAULT_CRITICAL_COLOR.to_string()
}
