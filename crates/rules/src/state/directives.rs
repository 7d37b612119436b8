//! What a single directive contributes to an element, and which elements a
//! directive pattern selects.

use flowstate_core::{AnimationKind, ElementState, EventState, LinkState, LinkTarget, ShapeState, TextState};
use indexmap::IndexMap;
use tracing::debug;

use crate::pattern::PatternCache;
use crate::schema::{ColorTarget, TextReplaceMode, DEFAULT_TEXT_TEMPLATE};
use crate::templates::{is_regex_text_template, resolve_text_template};

/// The sub-record write one directive performs on one element.
#[derive(Debug, Clone)]
pub(crate) enum Contribution<'r> {
    Shape {
        target: ColorTarget,
        hidden: bool,
    },
    Text {
        template: &'r str,
        mode: TextReplaceMode,
        original_label: &'r str,
    },
    Link {
        url: &'r str,
        target: LinkTarget,
        params: &'r str,
    },
    Event {
        animation: AnimationKind,
        duration: u64,
    },
}

impl Contribution<'_> {
    /// Write this contribution into `state`, whose scalar fields already
    /// describe the contributing rule.
    ///
    /// Shape writes merge into the existing shape record; text, link and
    /// event writes replace their record wholesale.
    pub(crate) fn apply_to(self, state: &mut ElementState) {
        match self {
            Contribution::Shape { target, hidden } => {
                let color = state.color.clone();
                let shape = state.shape.get_or_insert_with(|| ShapeState {
                    visible: !hidden,
                    ..ShapeState::default()
                });
                match target {
                    ColorTarget::FillColor | ColorTarget::GradientColor => shape.fill_color = Some(color),
                    ColorTarget::StrokeColor => shape.stroke_color = Some(color),
                    ColorTarget::FontColor => shape.font_color = Some(color),
                    ColorTarget::BgColor => shape.bg_color = Some(color),
                }
                shape.visible = !hidden;
            }
            Contribution::Text {
                template,
                mode,
                original_label,
            } => {
                let template = if template.is_empty() { DEFAULT_TEXT_TEMPLATE } else { template };
                let resolved = resolve_text_template(template, original_label, state);
                // Regex templates rewrite the label in place, so the mode
                // never wraps them.
                let value = if is_regex_text_template(template) {
                    resolved
                } else {
                    match mode {
                        TextReplaceMode::Content | TextReplaceMode::Pattern => resolved,
                        TextReplaceMode::Append => format!("{original_label}{resolved}"),
                        TextReplaceMode::Prepend => format!("{resolved}{original_label}"),
                    }
                };
                state.text = Some(TextState {
                    value: Some(value),
                    original_value: (!original_label.is_empty()).then(|| original_label.to_string()),
                });
            }
            Contribution::Link { url, target, params } => {
                state.link = Some(LinkState {
                    url: url.to_string(),
                    target,
                    params: params.to_string(),
                });
            }
            Contribution::Event { animation, duration } => {
                state.event = Some(EventState {
                    animation,
                    duration,
                    active: true,
                });
            }
        }
    }
}

/// Elements whose id or label matches `pattern`, in element order.
pub(crate) fn match_elements<'a>(
    pattern: &str,
    element_ids: &'a [String],
    element_labels: &IndexMap<String, String>,
    cache: &mut PatternCache,
) -> Vec<&'a str> {
    let compiled = cache.get(pattern);
    let matched: Vec<&str> = element_ids
        .iter()
        .filter(|id| {
            compiled.matches_any([id.as_str(), label_of(element_labels, id.as_str())])
        })
        .map(String::as_str)
        .collect();

    if matched.is_empty() && pattern != ".*" {
        debug!(pattern = %pattern, elements = element_ids.len(), "pattern matched no elements");
    }
    matched
}

/// Label of an element, empty when it has none.
pub(crate) fn label_of<'a>(element_labels: &'a IndexMap<String, String>, id: &str) -> &'a str {
    element_labels.get(id).map(String::as_str).unwrap_or_default()
}
