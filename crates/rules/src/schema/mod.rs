//! Rule-set schema types with serde deserialization.
//!
//! Defines the configuration consumed by the engine:
//! - `RuleSet`: YAML document header (apiVersion, kind, metadata) plus the ordered rules
//! - `Rule`: metric match, threshold or gradient evaluation, formatting, and directives
//! - Directives (`ShapeMap`, `TextMap`, `LinkMap`, `EventMap`) that decide which
//!   diagram elements a rule touches and under which severity

mod document;
mod mappings;
mod metadata;
mod rule;
mod thresholds;

pub use document::*;
pub use mappings::*;
pub use metadata::*;
pub use rule::*;
pub use thresholds::*;

#[cfg(test)]
mod tests;
