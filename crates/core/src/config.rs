use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::level::{
    ThresholdColors, DEFAULT_CRITICAL_COLOR, DEFAULT_NO_DATA_COLOR, DEFAULT_OK_COLOR,
    DEFAULT_WARNING_COLOR,
};
use crate::metric::Aggregation;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub engine: EngineConfig,
    pub rules: RulesConfig,
    pub log: LogConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `FLOWSTATE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("FLOWSTATE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            engine: EngineConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
            log: LogConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  engine:  aggregation={}, colors={}/{}/{}",
            self.engine.default_aggregation,
            self.engine.colors.ok,
            self.engine.colors.warning,
            self.engine.colors.critical
        );
        tracing::info!("  rules:   path={}", self.rules.path.display());
        tracing::info!("  log:     filter={}", self.log.filter);
    }

    /// Summary as JSON, for inspector output.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "engine": {
                "default_aggregation": self.engine.default_aggregation.as_str(),
                "colors": self.engine.colors,
                "no_data_color": self.engine.no_data_color,
            },
            "rules": { "path": self.rules.path },
            "log": { "filter": self.log.filter },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            engine: EngineConfig::default(),
            rules: RulesConfig::default(),
            log: LogConfig::default(),
        }
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Aggregation used for `ProcessedMetric::aggregated_value`.
    pub default_aggregation: Aggregation,
    /// Palette applied to rules that do not set their own colours.
    pub colors: ThresholdColors,
    pub no_data_color: String,
}

impl EngineConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            default_aggregation: Aggregation::from(profiled_env_or(
                p,
                "FLOWSTATE_DEFAULT_AGGREGATION",
                "current",
            )),
            colors: ThresholdColors::new(
                profiled_env_or(p, "FLOWSTATE_OK_COLOR", DEFAULT_OK_COLOR),
                profiled_env_or(p, "FLOWSTATE_WARNING_COLOR", DEFAULT_WARNING_COLOR),
                profiled_env_or(p, "FLOWSTATE_CRITICAL_COLOR", DEFAULT_CRITICAL_COLOR),
            ),
            no_data_color: profiled_env_or(p, "FLOWSTATE_NO_DATA_COLOR", DEFAULT_NO_DATA_COLOR),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_aggregation: Aggregation::Current,
            colors: ThresholdColors::default(),
            no_data_color: DEFAULT_NO_DATA_COLOR.to_string(),
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rule-set YAML file.
    pub path: PathBuf,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: PathBuf::from(profiled_env_or(p, "FLOWSTATE_RULES_PATH", "data/rules/flowchart.yml")),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/rules/flowchart.yml"),
        }
    }
}

// ── Logging ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub filter: String,
}

impl LogConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            filter: profiled_env_or(p, "FLOWSTATE_LOG", "info"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
