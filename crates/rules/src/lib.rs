//! Metric-to-visual-state rule engine for live diagrams.
//!
//! This crate provides:
//! - YAML rule sets with serde deserialization and a filesystem loader
//! - Pattern matching over metric names and diagram elements (regex, wildcard, exact)
//! - Metric extraction from tabular frames with value aggregation
//! - Discrete threshold and colour-gradient evaluation
//! - Per-element state computation with last-rule-wins precedence
//! - A `Surface` trait for pushing computed states into a rendering surface

pub mod applier;
pub mod engine;
pub mod evaluator;
pub mod loader;
pub mod metrics;
pub mod pattern;
pub mod schema;
pub mod state;
pub mod templates;
pub mod threshold;
pub mod validation;
