//! Pushing computed element states onto a rendering surface.
//!
//! The surface is whatever draws the diagram. All writes of one call happen
//! inside a single `begin_update` / `end_update` bracket. Elements the
//! surface does not know are skipped, and a failing element never stops the
//! remaining ones; failures are reported once per call.

mod memory;

pub use memory::{MemoryCell, MemorySurface};

use flowstate_core::{ElementState, EventState, ShapeState};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("cell not found: {0}")]
    CellNotFound(String),

    #[error("cell '{cell}' rejected the update: {reason}")]
    Rejected { cell: String, reason: String },
}

/// Mutation API of a diagram surface.
pub trait Surface {
    fn begin_update(&mut self);
    fn end_update(&mut self);

    /// True when a cell with this id exists.
    fn contains(&self, id: &str) -> bool;
    /// Id of the first cell currently displaying `value`.
    fn find_by_value(&self, value: &str) -> Option<String>;
    /// Displayed value (label) of a cell.
    fn value(&self, id: &str) -> Option<String>;

    fn set_style(&mut self, id: &str, key: &str, value: &str) -> Result<(), SurfaceError>;
    fn set_value(&mut self, id: &str, value: &str) -> Result<(), SurfaceError>;
    fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), SurfaceError>;

    fn clear_animations(&mut self, _id: &str) {}
    fn animate(&mut self, _id: &str, _event: &EventState) {}
}

/// Counts for one apply or reset call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub total: usize,
    pub applied: usize,
    /// Elements the surface has no cell for.
    pub skipped: usize,
    pub failed: usize,
}

/// Resolve an element id to a surface cell: by id, then by displayed value.
fn resolve_cell<S: Surface + ?Sized>(surface: &S, id: &str) -> Option<String> {
    if surface.contains(id) {
        Some(id.to_string())
    } else {
        surface.find_by_value(id)
    }
}

// ── Apply ───────────────────────────────────────────────────────────

/// Write every state onto the surface.
pub fn apply<S: Surface + ?Sized>(surface: &mut S, states: &IndexMap<String, ElementState>) -> ApplyReport {
    let mut report = ApplyReport {
        total: states.len(),
        ..ApplyReport::default()
    };
    if states.is_empty() {
        return report;
    }

    let mut first_error: Option<SurfaceError> = None;
    surface.begin_update();
    for (id, state) in states {
        let Some(cell) = resolve_cell(surface, id) else {
            report.skipped += 1;
            continue;
        };
        match apply_state(surface, &cell, state) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                report.failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }
    surface.end_update();

    if let Some(error) = first_error {
        warn!(failed = report.failed, total = report.total, error = %error, "some element states could not be applied");
    }
    info!(
        applied = report.applied,
        total = report.total,
        skipped = report.skipped,
        "applied element states"
    );
    report
}

fn apply_state<S: Surface + ?Sized>(surface: &mut S, cell: &str, state: &ElementState) -> Result<(), SurfaceError> {
    if let Some(shape) = &state.shape {
        apply_shape(surface, cell, shape)?;
    }

    if let Some(value) = state.text.as_ref().and_then(|t| t.value.as_deref()) {
        surface.set_value(cell, value)?;
    }

    if let Some(event) = &state.event {
        surface.clear_animations(cell);
        if state.is_animated() {
            surface.animate(cell, event);
        }
    }
    Ok(())
}

fn apply_shape<S: Surface + ?Sized>(surface: &mut S, cell: &str, shape: &ShapeState) -> Result<(), SurfaceError> {
    let styles = [
        ("fillColor", &shape.fill_color),
        ("strokeColor", &shape.stroke_color),
        ("fontColor", &shape.font_color),
        ("labelBackgroundColor", &shape.bg_color),
    ];
    for (key, color) in styles {
        if let Some(color) = color.as_deref().filter(|c| !c.is_empty()) {
            surface.set_style(cell, key, color)?;
        }
    }
    if let Some(opacity) = shape.opacity {
        surface.set_style(cell, "opacity", &format!("{}", (opacity * 100.0).round()))?;
    }
    surface.set_visible(cell, shape.visible)
}

// ── Reset ───────────────────────────────────────────────────────────

/// Labels of the given elements as the surface shows them now, for a later
/// [`reset`]. Elements without a cell are left out.
pub fn snapshot_labels<S: Surface + ?Sized>(surface: &S, element_ids: &[String]) -> IndexMap<String, String> {
    element_ids
        .iter()
        .filter_map(|id| surface.value(id).map(|v| (id.clone(), v)))
        .collect()
}

/// Restore labels and make every listed element visible again, whether or
/// not a rule ever touched it.
pub fn reset<S: Surface + ?Sized>(surface: &mut S, original_labels: &IndexMap<String, String>) -> ApplyReport {
    let mut report = ApplyReport {
        total: original_labels.len(),
        ..ApplyReport::default()
    };

    let mut first_error: Option<SurfaceError> = None;
    surface.begin_update();
    for (id, label) in original_labels {
        let Some(cell) = resolve_cell(surface, id) else {
            report.skipped += 1;
            continue;
        };
        surface.clear_animations(&cell);
        match surface.set_value(&cell, label).and_then(|()| surface.set_visible(&cell, true)) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                report.failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }
    surface.end_update();

    if let Some(error) = first_error {
        warn!(failed = report.failed, total = report.total, error = %error, "some elements could not be reset");
    }
    info!(restored = report.applied, total = report.total, "reset element states");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowstate_core::{AnimationKind, Level, TextState};

    fn state(id: &str) -> ElementState {
        ElementState {
            element_id: id.into(),
            rule_id: "r".into(),
            rule_name: "R".into(),
            level: Level::Critical,
            value: 1.0,
            formatted_value: "1".into(),
            color: "#f00".into(),
            matched: true,
            timestamp: Utc::now(),
            shape: None,
            text: None,
            link: None,
            tooltip: None,
            event: None,
        }
    }

    fn shaped(id: &str) -> ElementState {
        let mut s = state(id);
        s.shape = Some(ShapeState {
            fill_color: Some("#f00".into()),
            bg_color: Some("#fff".into()),
            opacity: Some(0.456),
            visible: false,
            ..ShapeState::default()
        });
        s.text = Some(TextState {
            value: Some("HOT".into()),
            original_value: Some("pump".into()),
        });
        s
    }

    #[test]
    fn pushes_styles_text_and_visibility() {
        let mut surface = MemorySurface::new().with_cell("n1", "pump");
        let states: IndexMap<_, _> = [("n1".to_string(), shaped("n1"))].into_iter().collect();

        let report = apply(&mut surface, &states);
        assert_eq!(report, ApplyReport { total: 1, applied: 1, skipped: 0, failed: 0 });

        let cell = surface.cell("n1").unwrap();
        assert_eq!(cell.styles["fillColor"], "#f00");
        assert_eq!(cell.styles["labelBackgroundColor"], "#fff");
        assert_eq!(cell.styles["opacity"], "46");
        assert!(!cell.styles.contains_key("strokeColor"));
        assert_eq!(cell.value, "HOT");
        assert!(!cell.visible);
        assert_eq!(surface.completed_updates(), 1);
    }

    #[test]
    fn unknown_elements_are_skipped_and_value_lookup_is_a_fallback() {
        let mut surface = MemorySurface::new().with_cell("cell-9", "pump");
        let states: IndexMap<_, _> = [
            ("pump".to_string(), shaped("pump")),
            ("ghost".to_string(), shaped("ghost")),
        ]
        .into_iter()
        .collect();

        let report = apply(&mut surface, &states);
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(surface.cell("cell-9").unwrap().value, "HOT");
    }

    #[test]
    fn one_failing_element_does_not_block_the_rest() {
        let mut surface = MemorySurface::new()
            .with_cell("a", "A")
            .with_cell("b", "B")
            .with_cell("c", "C");
        surface.reject("b", "locked");
        let states: IndexMap<_, _> = ["a", "b", "c"].iter().map(|id| (id.to_string(), shaped(id))).collect();

        let report = apply(&mut surface, &states);
        assert_eq!(report.applied, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(surface.cell("c").unwrap().value, "HOT");
        assert!(!surface.is_updating());
    }

    #[test]
    fn events_restart_animation() {
        let mut surface = MemorySurface::new().with_cell("fan", "Fan");
        let mut s = state("fan");
        s.event = Some(EventState {
            animation: AnimationKind::Rotate,
            duration: 2000,
            active: true,
        });
        let states: IndexMap<_, _> = [("fan".to_string(), s)].into_iter().collect();

        apply(&mut surface, &states);
        let animation = surface.cell("fan").unwrap().animation.clone().unwrap();
        assert_eq!(animation.animation, AnimationKind::Rotate);
    }

    #[test]
    fn inactive_event_only_clears_animation() {
        let mut surface = MemorySurface::new().with_cell("fan", "Fan");
        let mut s = state("fan");
        s.event = Some(EventState {
            animation: AnimationKind::Rotate,
            duration: 2000,
            active: true,
        });
        let mut states: IndexMap<_, _> = [("fan".to_string(), s)].into_iter().collect();
        apply(&mut surface, &states);

        let s = states.get_mut("fan").unwrap();
        s.event.as_mut().unwrap().active = false;
        assert!(!s.is_animated());
        apply(&mut surface, &states);
        assert!(surface.cell("fan").unwrap().animation.is_none());
    }

    #[test]
    fn empty_state_map_does_not_open_an_update() {
        let mut surface = MemorySurface::new().with_cell("a", "A");
        let report = apply(&mut surface, &IndexMap::new());
        assert_eq!(report.total, 0);
        assert_eq!(surface.completed_updates(), 0);
    }

    #[test]
    fn reset_restores_snapshot() {
        let mut surface = MemorySurface::new().with_cell("a", "A").with_cell("b", "B");
        let ids = vec!["a".to_string(), "b".to_string(), "missing".to_string()];
        let original = snapshot_labels(&surface, &ids);
        assert_eq!(original.len(), 2);

        let states: IndexMap<_, _> = [("a".to_string(), shaped("a"))].into_iter().collect();
        apply(&mut surface, &states);
        surface.set_visible("b", false).unwrap();

        let report = reset(&mut surface, &original);
        assert_eq!(report.applied, 2);
        for (id, label) in [("a", "A"), ("b", "B")] {
            let cell = surface.cell(id).unwrap();
            assert_eq!(cell.value, label);
            assert!(cell.visible);
        }
    }
}
