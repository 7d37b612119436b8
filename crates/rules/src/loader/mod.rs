//! Filesystem rule-set loader.
//!
//! Reads `FlowchartRules` YAML documents from a single file or from a
//! directory tree, keeping the loaded sets in memory keyed by `metadata.id`.

mod core;
mod error;


pub use self::core::RuleSetLoader;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
