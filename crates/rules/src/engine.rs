//! One refresh cycle end to end: frames to metrics, metrics to rule
//! results, rule results to element states.

use std::borrow::Cow;

use flowstate_core::config::EngineConfig;
use flowstate_core::{ElementState, Frame, InputDocument, ProcessedMetric, ThresholdColors};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::evaluator::{evaluate_all_rules, RuleResult};
use crate::metrics::process_frames;
use crate::pattern::PatternCache;
use crate::schema::Rule;
use crate::state::compute_states;
use crate::templates::HostVariables;

/// The diagram's addressable elements: ids in diagram order plus labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementCatalog {
    pub ids: Vec<String>,
    pub labels: IndexMap<String, String>,
}

impl ElementCatalog {
    pub fn new(ids: Vec<String>, labels: IndexMap<String, String>) -> Self {
        Self { ids, labels }
    }

    /// Append an element; an empty label is not recorded.
    pub fn with_element(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let label = label.into();
        if !label.is_empty() {
            self.labels.insert(id.clone(), label);
        }
        self.ids.push(id);
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<&InputDocument> for ElementCatalog {
    fn from(doc: &InputDocument) -> Self {
        Self::new(doc.element_ids.clone(), doc.element_labels.clone())
    }
}

/// Everything one cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub metrics: Vec<ProcessedMetric>,
    pub results: Vec<RuleResult>,
    pub states: IndexMap<String, ElementState>,
}

/// Runs refresh cycles. Keeps compiled patterns between cycles; holds no
/// other state.
#[derive(Debug, Default)]
pub struct Engine {
    config: EngineConfig,
    cache: PatternCache,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: PatternCache::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.cache.len()
    }

    /// Run one refresh cycle.
    ///
    /// Rules still carrying the built-in palette are evaluated with the
    /// configured palette instead.
    pub fn run(
        &mut self,
        frames: &[Frame],
        rules: &[Rule],
        catalog: &ElementCatalog,
        host: &dyn HostVariables,
    ) -> Snapshot {
        let rules = self.with_palette(rules);
        let metrics = process_frames(frames, &self.config.default_aggregation);
        let results = evaluate_all_rules(&rules, &metrics, host, &mut self.cache);
        let states = compute_states(&rules, &results, &catalog.ids, &catalog.labels, &mut self.cache);

        debug!(
            metrics = metrics.len(),
            results = results.len(),
            states = states.len(),
            patterns = self.cache.len(),
            "refresh cycle complete"
        );

        Snapshot {
            metrics,
            results,
            states,
        }
    }

    fn with_palette<'r>(&self, rules: &'r [Rule]) -> Cow<'r, [Rule]> {
        let builtin = ThresholdColors::default();
        if self.config.colors == builtin || rules.iter().all(|r| r.colors != builtin) {
            return Cow::Borrowed(rules);
        }
        Cow::Owned(
            rules
                .iter()
                .cloned()
                .map(|mut rule| {
                    if rule.colors == builtin {
                        rule.colors = self.config.colors.clone();
                    }
                    rule
                })
                .collect(),
        )
    }
}
