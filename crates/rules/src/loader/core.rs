//! [`RuleSetLoader`]: YAML rule sets from files and directories.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::schema::{Rule, RuleSet, RULE_SET_KIND};

use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Loads rule sets from a directory (recursively) and keeps them in memory
/// keyed by `metadata.id`, in load order.
pub struct RuleSetLoader {
    rules_dir: PathBuf,
    rule_sets: IndexMap<String, RuleSet>,
}

impl RuleSetLoader {
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules_dir: rules_dir.into(),
            rule_sets: IndexMap::new(),
        }
    }

    /// Parse one YAML document into a rule set.
    ///
    /// The document must declare `kind: FlowchartRules` and a non-empty
    /// `metadata.id`.
    pub fn parse_str(yaml: &str) -> Result<RuleSet> {
        let set: RuleSet = serde_yaml::from_str(yaml)?;

        if set.kind != RULE_SET_KIND {
            return Err(RuleError::Validation(format!(
                "unsupported kind '{}', expected '{}'",
                set.kind, RULE_SET_KIND
            )));
        }
        if set.metadata.id.is_empty() {
            return Err(RuleError::Validation(
                "rule set metadata.id must not be empty".to_string(),
            ));
        }
        Ok(set)
    }

    /// Read and parse a single rule-set file.
    pub fn load_file(path: &Path) -> Result<RuleSet> {
        let contents = fs::read_to_string(path)?;
        Self::parse_str(&contents)
    }

    /// Recursively scan the rules directory and load every YAML file.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse errors are reported
    /// per file and do not abort the scan. A later file with an id already
    /// loaded replaces the earlier set.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let dir = self.rules_dir.clone();
        self.scan_dir_recursive(&dir, &mut results)?;
        Ok(results)
    }

    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        // Sorted so load order, and therefore rule order, is stable.
        let mut paths = entries.map(|e| e.map(|e| e.path())).collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match Self::load_file(&path) {
                Ok(set) => {
                    let rule_set_id = set.metadata.id.clone();
                    let rules = set.rules.len();
                    info!(rule_set_id = %rule_set_id, rules, path = %path.display(), "loaded rule set");
                    self.rule_sets.insert(rule_set_id.clone(), set);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { rule_set_id, rules },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule set file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Loaded rule sets keyed by id, in load order.
    pub fn rule_sets(&self) -> &IndexMap<String, RuleSet> {
        &self.rule_sets
    }

    pub fn rule_set(&self, id: &str) -> Option<&RuleSet> {
        self.rule_sets.get(id)
    }

    /// Rules of every enabled set, concatenated in load order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rule_sets
            .values()
            .filter(|set| set.metadata.enabled)
            .flat_map(|set| set.rules.iter().cloned())
            .collect()
    }
}
