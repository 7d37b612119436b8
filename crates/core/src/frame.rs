//! Tabular input frames and the decoded input document.
//!
//! A [`Frame`] is one query result: a set of named, typed columns of equal
//! length. Cells are kept as raw JSON values so that string-typed columns
//! (CSV data sources) can be coerced later by the metric processor.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowstateError;

/// Column type as reported by the data source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Time,
    Number,
    String,
    #[default]
    #[serde(other)]
    Other,
}

/// One named column of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Time column from epoch-millisecond timestamps.
    pub fn time(name: impl Into<String>, millis: &[f64]) -> Self {
        Self::new(name, FieldKind::Time, millis.iter().map(|v| Value::from(*v)).collect())
    }

    pub fn number(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, FieldKind::Number, values.iter().map(|v| Value::from(*v)).collect())
    }

    pub fn string(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, FieldKind::String, values.iter().map(|v| Value::from(*v)).collect())
    }
}

/// One tabular query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub name: Option<String>,
    /// Originating query id.
    #[serde(default, alias = "refId")]
    pub source_id: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            name: None,
            source_id: source_id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Number of rows, taken from the longest column.
    pub fn row_count(&self) -> usize {
        self.fields.iter().map(|f| f.values.len()).max().unwrap_or(0)
    }

    /// Reject frames whose columns have different lengths.
    pub fn validate(&self) -> Result<(), FlowstateError> {
        let rows = self.row_count();
        if let Some(short) = self.fields.iter().find(|f| f.values.len() != rows) {
            return Err(FlowstateError::InvalidInput(format!(
                "frame '{}': field '{}' has {} values, expected {}",
                self.source_id,
                short.name,
                short.values.len(),
                rows
            )));
        }
        Ok(())
    }
}

/// Everything one refresh cycle consumes from its collaborators: the data
/// frames plus the decoded element universe of the diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub frames: Vec<Frame>,
    /// Element identifiers. When empty, the keys of `element_labels` are used.
    #[serde(default)]
    pub element_ids: Vec<String>,
    #[serde(default)]
    pub element_labels: IndexMap<String, String>,
}

impl InputDocument {
    pub fn from_json(json: &str) -> Result<Self, FlowstateError> {
        let mut doc: InputDocument = serde_json::from_str(json)?;
        for frame in &doc.frames {
            frame.validate()?;
        }
        if doc.element_ids.is_empty() {
            doc.element_ids = doc.element_labels.keys().cloned().collect();
        }
        Ok(doc)
    }

    pub fn from_file(path: &Path) -> Result<Self, FlowstateError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_frames_with_grafana_field_names() {
        let doc = InputDocument::from_json(
            r#"{
                "frames": [{
                    "refId": "A",
                    "fields": [
                        {"name": "time", "type": "time", "values": [1, 2]},
                        {"name": "cpu", "type": "number", "values": [10, 20]},
                        {"name": "flag", "type": "boolean", "values": [true, false]}
                    ]
                }],
                "element_labels": {"n1": "cpu", "n2": "mem"}
            }"#,
        )
        .unwrap();

        assert_eq!(doc.frames[0].source_id, "A");
        assert_eq!(doc.frames[0].fields[2].kind, FieldKind::Other);
        assert_eq!(doc.element_ids, vec!["n1", "n2"]);
    }

    #[test]
    fn ragged_frame_is_rejected() {
        let err = InputDocument::from_json(
            r#"{"frames": [{"fields": [
                {"name": "a", "type": "number", "values": [1, 2]},
                {"name": "b", "type": "number", "values": [1]}
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FlowstateError::InvalidInput(_)));
    }
}
