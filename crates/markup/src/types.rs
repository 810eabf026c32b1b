use redline_config::StrokeWidthConfig;
use serde::{Deserialize, Serialize};

/// Annotation tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Rectangle,
}

/// Stroke width class, resolved against the shorter display side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WidthClass {
    Thin,
    #[default]
    Medium,
    Thick,
}

impl WidthClass {
    /// Resolve to a width in display pixels
    pub fn resolve(self, display_width: u32, display_height: u32, widths: &StrokeWidthConfig) -> f32 {
        let divisor = match self {
            WidthClass::Thin => widths.thin_divisor,
            WidthClass::Medium => widths.medium_divisor,
            WidthClass::Thick => widths.thick_divisor,
        };
        let shorter = display_width.min(display_height) as f32;
        if divisor <= 0.0 {
            return widths.min_width.max(1.0);
        }
        (shorter / divisor).max(widths.min_width)
    }
}

/// Blend modes for annotation pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Paint color over existing annotation pixels
    #[default]
    Normal = 0,
    /// Clear annotation pixels to transparency, revealing the photo
    Erase = 1,
}

/// Active tool selection as seen by the next gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig {
    pub tool: Tool,
    pub width: WidthClass,
    /// RGBA 0.0-1.0, ignored by the eraser
    pub color: [f32; 4],
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            width: WidthClass::Medium,
            color: [1.0, 0.0, 0.0, 1.0], // Default to red
        }
    }
}

impl ToolConfig {
    /// Blend mode implied by the tool
    pub fn blend_mode(&self) -> BlendMode {
        match self.tool {
            Tool::Eraser => BlendMode::Erase,
            Tool::Brush | Tool::Rectangle => BlendMode::Normal,
        }
    }
}

/// Pointer phase in engine terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}
