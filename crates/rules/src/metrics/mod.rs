//! Metric extraction from input frames and metric selection for rules.
//!
//! Frames arrive in one of two shapes:
//! - **Wide**: every numeric column is its own series, named after the column.
//! - **Pivoted**: a `metric` / `Metric` column names the series each row
//!   belongs to; every numeric column is split by that discriminator.
//!
//! Cells that are empty or do not parse as finite numbers are dropped.

mod aggregate;

pub use aggregate::aggregate;

use chrono::DateTime;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use flowstate_core::{Aggregation, Field, FieldKind, Frame, ProcessedMetric};

use crate::pattern::PatternCache;
use crate::templates::HostVariables;

/// Column names that mark a pivoted frame.
const DISCRIMINATOR_NAMES: &[&str] = &["metric", "Metric"];

/// One kept row: the numeric value and, when the frame has a time column,
/// the row's timestamp.
type Row = (f64, Option<f64>);

// ── Extraction ──────────────────────────────────────────────────────

/// Turn frames into named numeric series.
///
/// `aggregation` is recorded on every metric and used for its
/// `aggregated_value`. Series without a single valid value are not emitted.
pub fn process_frames(frames: &[Frame], aggregation: &Aggregation) -> Vec<ProcessedMetric> {
    let mut metrics = Vec::new();

    for frame in frames {
        let time_field = frame.fields.iter().find(|f| f.kind == FieldKind::Time);
        let discriminator = frame
            .fields
            .iter()
            .position(|f| DISCRIMINATOR_NAMES.contains(&f.name.as_str()));

        for (idx, field) in frame.fields.iter().enumerate() {
            if field.kind == FieldKind::Time || Some(idx) == discriminator {
                continue;
            }
            let clean = clean_field_name(&field.name);
            let lower = clean.to_lowercase();
            if lower == "time" || lower == "timestamp" {
                continue;
            }

            match discriminator {
                Some(d) => {
                    let groups = pivot_rows(field, &frame.fields[d], time_field);
                    for (key, rows) in groups {
                        if let Some(m) = build_metric(
                            key.clone(),
                            frame,
                            field,
                            key,
                            rows,
                            time_field.is_some(),
                            aggregation,
                        ) {
                            metrics.push(m);
                        }
                    }
                }
                None => {
                    let name = if !clean.is_empty() {
                        clean
                    } else {
                        frame
                            .name
                            .clone()
                            .filter(|n| !n.is_empty())
                            .unwrap_or_else(|| frame.source_id.clone())
                    };
                    let rows = wide_rows(field, time_field);
                    if let Some(m) = build_metric(
                        name.clone(),
                        frame,
                        field,
                        name,
                        rows,
                        time_field.is_some(),
                        aggregation,
                    ) {
                        metrics.push(m);
                    }
                }
            }
        }
    }

    debug!(frames = frames.len(), metrics = metrics.len(), "processed frames");
    metrics
}

/// Strip quote and BOM characters, then surrounding whitespace.
fn clean_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && *c != '\u{feff}')
        .collect::<String>()
        .trim()
        .to_string()
}

fn wide_rows(field: &Field, time_field: Option<&Field>) -> Vec<Row> {
    field
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            numeric_cell(field.kind, cell).map(|v| (v, time_field.and_then(|t| timestamp_at(t, i))))
        })
        .collect()
}

fn pivot_rows(field: &Field, discriminator: &Field, time_field: Option<&Field>) -> IndexMap<String, Vec<Row>> {
    let mut groups: IndexMap<String, Vec<Row>> = IndexMap::new();

    for (i, key_cell) in discriminator.values.iter().enumerate() {
        let key = match discriminator_key(key_cell) {
            Some(k) => k,
            None => continue,
        };
        let rows = groups.entry(key).or_default();
        if let Some(v) = field.values.get(i).and_then(|cell| numeric_cell(field.kind, cell)) {
            rows.push((v, time_field.and_then(|t| timestamp_at(t, i))));
        }
    }

    groups
}

fn build_metric(
    name: String,
    frame: &Frame,
    field: &Field,
    column_name: String,
    rows: Vec<Row>,
    has_time: bool,
    aggregation: &Aggregation,
) -> Option<ProcessedMetric> {
    if rows.is_empty() {
        return None;
    }

    let values: Vec<f64> = rows.iter().map(|(v, _)| *v).collect();
    // Timestamps are kept only when every kept row has one.
    let timestamps: Vec<f64> = if has_time {
        rows.iter().map(|(_, t)| *t).collect::<Option<Vec<f64>>>().unwrap_or_default()
    } else {
        Vec::new()
    };
    let last_value = *values.last()?;
    let aggregated_value = aggregate(&values, aggregation);

    Some(ProcessedMetric {
        name,
        source_id: frame.source_id.clone(),
        values,
        timestamps,
        last_value,
        aggregated_value,
        aggregation: aggregation.clone(),
        field_name: field.name.clone(),
        column_name,
    })
}

/// Numeric reading of a cell. Number columns accept only numbers; string and
/// untyped columns also accept numeric text.
fn numeric_cell(kind: FieldKind, cell: &Value) -> Option<f64> {
    let n = match (kind, cell) {
        (_, Value::Number(n)) => n.as_f64(),
        (FieldKind::String | FieldKind::Other, Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// Epoch milliseconds for row `i` of a time column.
fn timestamp_at(time_field: &Field, i: usize) -> Option<f64> {
    match time_field.values.get(i)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp_millis() as f64)
        }),
        _ => None,
    }
}

fn discriminator_key(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ── Selection ───────────────────────────────────────────────────────

/// Select the metrics a rule reads.
///
/// A non-empty `column` is resolved through the host and matched exactly
/// against `column_name` or `name`; when that finds anything it is the whole
/// answer. Otherwise `target` (also host-resolved) is matched as a pattern
/// against `name`, falling back to `source_id`. An empty target selects every
/// metric.
pub fn find_matching_metrics<'a>(
    metrics: &'a [ProcessedMetric],
    target: &str,
    column: &str,
    host: &dyn HostVariables,
    cache: &mut PatternCache,
) -> Vec<&'a ProcessedMetric> {
    if !column.is_empty() {
        let column = host.resolve(column);
        let by_column: Vec<&ProcessedMetric> = metrics
            .iter()
            .filter(|m| m.column_name == column || m.name == column)
            .collect();
        if !by_column.is_empty() {
            return by_column;
        }
    }

    let target = host.resolve(target);
    if target.is_empty() {
        return metrics.iter().collect();
    }

    let pattern = cache.get(&target);
    metrics
        .iter()
        .filter(|m| pattern.is_match(&m.name) || pattern.is_match(&m.source_id))
        .collect()
}
