//! In-memory [`Surface`] used by the CLI and tests.

use std::collections::HashMap;

use flowstate_core::EventState;
use indexmap::IndexMap;
use serde::Serialize;

use super::{Surface, SurfaceError};

/// One diagram cell as the in-memory surface records it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryCell {
    pub value: String,
    pub visible: bool,
    pub styles: IndexMap<String, String>,
    pub animation: Option<EventState>,
}

impl MemoryCell {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            visible: true,
            styles: IndexMap::new(),
            animation: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    cells: IndexMap<String, MemoryCell>,
    /// Cells that refuse every write, with the reason reported.
    rejected: HashMap<String, String>,
    depth: usize,
    completed: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(id.into(), MemoryCell::new(value));
        self
    }

    /// Build a surface from element ids and their labels.
    pub fn from_elements(ids: &[String], labels: &IndexMap<String, String>) -> Self {
        let cells = ids
            .iter()
            .map(|id| {
                let label = labels.get(id).cloned().unwrap_or_default();
                (id.clone(), MemoryCell::new(label))
            })
            .collect();
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Make every write to `id` fail.
    pub fn reject(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.rejected.insert(id.into(), reason.into());
    }

    pub fn cell(&self, id: &str) -> Option<&MemoryCell> {
        self.cells.get(id)
    }

    pub fn cells(&self) -> &IndexMap<String, MemoryCell> {
        &self.cells
    }

    pub fn is_updating(&self) -> bool {
        self.depth > 0
    }

    /// Number of outermost update brackets closed so far.
    pub fn completed_updates(&self) -> usize {
        self.completed
    }

    fn writable(&mut self, id: &str) -> Result<&mut MemoryCell, SurfaceError> {
        if let Some(reason) = self.rejected.get(id) {
            return Err(SurfaceError::Rejected {
                cell: id.to_string(),
                reason: reason.clone(),
            });
        }
        self.cells
            .get_mut(id)
            .ok_or_else(|| SurfaceError::CellNotFound(id.to_string()))
    }
}

impl Surface for MemorySurface {
    fn begin_update(&mut self) {
        self.depth += 1;
    }

    fn end_update(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.completed += 1;
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.cells.contains_key(id)
    }

    fn find_by_value(&self, value: &str) -> Option<String> {
        self.cells
            .iter()
            .find(|(_, cell)| cell.value == value)
            .map(|(id, _)| id.clone())
    }

    fn value(&self, id: &str) -> Option<String> {
        self.cells.get(id).map(|c| c.value.clone())
    }

    fn set_style(&mut self, id: &str, key: &str, value: &str) -> Result<(), SurfaceError> {
        self.writable(id)?.styles.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_value(&mut self, id: &str, value: &str) -> Result<(), SurfaceError> {
        self.writable(id)?.value = value.to_string();
        Ok(())
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError> {
        self.writable(id)?.visible = visible;
        Ok(())
    }

    fn clear_animations(&mut self, id: &str) {
        if let Some(cell) = self.cells.get_mut(id) {
            cell.animation = None;
        }
    }

    fn animate(&mut self, id: &str, event: &EventState) {
        if let Some(cell) = self.cells.get_mut(id) {
            cell.animation = Some(event.clone());
        }
    }
}
