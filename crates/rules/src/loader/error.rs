//! Error types and load result structures for the rule-set loader.

use std::path::PathBuf;

/// Errors that can occur while loading rule sets.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Document is well-formed YAML but not a usable rule set.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { rule_set_id: String, rules: usize },
    /// Dotfile or non-YAML file.
    Skipped { reason: String },
    /// Parse or validation error.
    Failed { error: String },
}
