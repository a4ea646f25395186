use serde::{Deserialize, Serialize};

/// A recorded click as percentages of the surface's intrinsic width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedPoint {
    pub x: f64,
    pub y: f64,
}

impl RecordedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A real click observed on the surface, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerClick {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerClick {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Kind of synthesized event, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    PointerDown,
    PointerUp,
    Click,
}

impl EventKind {
    /// DOM event type name
    pub fn dom_type(&self) -> &'static str {
        match self {
            EventKind::PointerDown => "mousedown",
            EventKind::PointerUp => "mouseup",
            EventKind::Click => "click",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dom_type())
    }
}

/// A programmatically constructed pointer event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticEvent {
    pub kind: EventKind,
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    /// Offset from the surface's top-left corner in intrinsic pixels
    pub surface_x: f64,
    pub surface_y: f64,
}
