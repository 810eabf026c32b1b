//! Pointer input and layout types.

use serde::{Deserialize, Serialize};

/// Phase of a pointer/touch event within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// Surface lost or touch interrupted; handled exactly like `Up`
    Cancel,
}

/// Pointer event in viewport (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, client_x: f32, client_y: f32) -> Self {
        Self {
            phase,
            client_x,
            client_y,
        }
    }
}

/// Rendered bounding box of the canvas element, in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}
