//! Tool command types for the annotation engine.

use serde::{Deserialize, Serialize};

/// Annotation tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
}

/// Stroke width class, resolved by the engine against the display size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthClass {
    Thin,
    #[default]
    Medium,
    Thick,
}

/// Commands for controlling the active tool. Applied to the next gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolCommand {
    /// Select the active tool
    SetTool { tool: ToolKind },
    /// Select the stroke width class
    SetStrokeWidth { width: WidthClass },
    /// Set annotation color (RGBA, 0.0-1.0); ignored by the eraser
    SetColor { color: [f32; 4] },
}
