//! Per-element visual state produced by one computation pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Animation applied to an element by an event directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    Blink,
    Fade,
    Pulse,
    Flow,
    Rotate,
}

/// Browsing context a link opens in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkTarget {
    #[default]
    #[serde(rename = "_blank")]
    Blank,
    #[serde(rename = "_self")]
    Current,
    #[serde(rename = "_top")]
    Top,
    #[serde(rename = "_parent")]
    Parent,
}

impl LinkTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkTarget::Blank => "_blank",
            LinkTarget::Current => "_self",
            LinkTarget::Top => "_top",
            LinkTarget::Parent => "_parent",
        }
    }
}

/// Colour and visibility overrides for an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub font_color: Option<String>,
    pub bg_color: Option<String>,
    /// Fraction in `0.0..=1.0`.
    pub opacity: Option<f64>,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextState {
    /// Resolved label text.
    pub value: Option<String>,
    /// Label before any rule touched it.
    pub original_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
    pub url: String,
    pub target: LinkTarget,
    pub params: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub content: String,
    pub metric_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventState {
    pub animation: AnimationKind,
    /// Milliseconds.
    pub duration: u64,
    pub active: bool,
}

/// Accumulated state of one diagram element.
///
/// The scalar fields describe the most recent rule that touched the element;
/// the optional sub-records are written by the directive kind they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub element_id: String,
    pub rule_id: String,
    pub rule_name: String,
    pub level: Level,
    pub value: f64,
    pub formatted_value: String,
    pub color: String,
    pub matched: bool,
    pub timestamp: DateTime<Utc>,
    pub shape: Option<ShapeState>,
    pub text: Option<TextState>,
    pub link: Option<LinkState>,
    pub tooltip: Option<TooltipState>,
    pub event: Option<EventState>,
}

impl ElementState {
    /// True when the state asks the surface to hide the element.
    pub fn is_hidden(&self) -> bool {
        self.shape.as_ref().is_some_and(|s| !s.visible)
    }

    /// True when an event directive left an animation running.
    pub fn is_animated(&self) -> bool {
        self.event.as_ref().is_some_and(|e| e.active)
    }
}
