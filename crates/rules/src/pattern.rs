//! Pattern compilation and matching for metric names and diagram elements.
//!
//! A pattern string is classified, in order, as:
//! 1. an explicit regex literal `/body/flags`,
//! 2. an implicit, unanchored regex when a `*` or `?` quantifies a regex
//!    atom (`.*`, `(a|b)?`, `[0-9]*`, `\d*`),
//! 3. a wildcard (any other `*` or `?`), anchored at both ends,
//! 4. an implicit regex (contains other regex metacharacters),
//! 5. an exact string.
//!
//! Regexes that fail to compile produce [`Pattern::Never`]: the pattern
//! silently matches nothing.

use std::collections::HashMap;
use std::fmt;

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Characters that turn a plain pattern into an implicit regex.
const REGEX_METACHARACTERS: &[char] = &['.', '+', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\'];

/// How a compiled pattern decides a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Regex,
    Wildcard,
    Exact,
    Never,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Regex => write!(f, "regex"),
            MatchKind::Wildcard => write!(f, "wildcard"),
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::Never => write!(f, "never"),
        }
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(Regex),
    Wildcard(Regex),
    Exact(String),
    /// Empty or uncompilable pattern.
    Never,
}

impl Pattern {
    /// Classify and compile a pattern string. Never fails.
    pub fn compile(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Pattern::Never;
        }

        if let Some((body, flags)) = split_regex_literal(pattern) {
            return match build_regex(body, flags) {
                Ok(re) => Pattern::Regex(re),
                Err(e) => {
                    debug!(pattern = %pattern, error = %e, "invalid regex pattern, it will never match");
                    Pattern::Never
                }
            };
        }

        if has_quantified_atom(pattern) {
            return match Regex::new(pattern) {
                Ok(re) => Pattern::Regex(re),
                Err(e) => {
                    debug!(pattern = %pattern, error = %e, "invalid implicit regex, it will never match");
                    Pattern::Never
                }
            };
        }

        if pattern.contains('*') || pattern.contains('?') {
            return match Regex::new(&wildcard_to_regex(pattern)) {
                Ok(re) => Pattern::Wildcard(re),
                Err(e) => {
                    debug!(pattern = %pattern, error = %e, "invalid wildcard pattern, it will never match");
                    Pattern::Never
                }
            };
        }

        if pattern.contains(REGEX_METACHARACTERS) {
            return match Regex::new(pattern) {
                Ok(re) => Pattern::Regex(re),
                Err(e) => {
                    debug!(pattern = %pattern, error = %e, "invalid implicit regex, it will never match");
                    Pattern::Never
                }
            };
        }

        Pattern::Exact(pattern.to_string())
    }

    /// Test one identifier. Empty identifiers never match.
    pub fn is_match(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        match self {
            Pattern::Regex(re) | Pattern::Wildcard(re) => re.is_match(text),
            Pattern::Exact(s) => s == text,
            Pattern::Never => false,
        }
    }

    /// Test several identifiers in order, stopping at the first hit.
    pub fn matches_any<'a, I>(&self, identifiers: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        identifiers.into_iter().any(|id| self.is_match(id))
    }

    pub fn kind(&self) -> MatchKind {
        match self {
            Pattern::Regex(_) => MatchKind::Regex,
            Pattern::Wildcard(_) => MatchKind::Wildcard,
            Pattern::Exact(_) => MatchKind::Exact,
            Pattern::Never => MatchKind::Never,
        }
    }
}

/// Compiled patterns keyed by their source string.
///
/// Owned by the caller; one cache may be shared across computation passes
/// since compilation is a pure function of the pattern string.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Pattern>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled form of `pattern`, compiling it on first use.
    pub fn get(&mut self, pattern: &str) -> &Pattern {
        if !self.compiled.contains_key(pattern) {
            self.compiled.insert(pattern.to_string(), Pattern::compile(pattern));
        }
        &self.compiled[pattern]
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn clear(&mut self) {
        self.compiled.clear();
    }
}

/// Split `/body/flags` into its parts. The closing slash is the last one.
pub(crate) fn split_regex_literal(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let last = rest.rfind('/')?;
    Some((&rest[..last], &rest[last + 1..]))
}

/// Build a regex from a body and JavaScript-style flags.
///
/// `i`, `m` and `s` map onto regex options; `g`, `u`, `y` and `d` do not
/// change matching and are accepted. Any other flag is an error.
pub(crate) fn build_regex(body: &str, flags: &str) -> Result<Regex, String> {
    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'u' | 'y' | 'd' => {}
            other => return Err(format!("unsupported regex flag '{}'", other)),
        }
    }
    builder.build().map_err(|e| e.to_string())
}

/// True when some `*` or `?` directly follows `.`, `)`, `]`, `}` or an
/// escaped character, making it a regex quantifier rather than a wildcard.
fn has_quantified_atom(pattern: &str) -> bool {
    let mut escaped = false;
    let mut after_atom = false;
    for ch in pattern.chars() {
        if escaped {
            escaped = false;
            after_atom = true;
            continue;
        }
        match ch {
            '*' | '?' if after_atom => return true,
            '\\' => {
                escaped = true;
                after_atom = false;
            }
            '.' | ')' | ']' | '}' => after_atom = true,
            _ => after_atom = false,
        }
    }
    false
}

/// Translate a wildcard pattern into an anchored regex.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}
