//! Annotation pipeline
//!
//! Connects the pieces of one editing session at display resolution:
//! - Tool state machine (press / drag / release / cancel)
//! - Tiled annotation layer (stroke and rectangle rasterization)
//! - History stack (copy-on-write tile snapshots)
//! - Annotation log (records replayed on export)
//!
//! The display photo itself is never modified; it is composited under the
//! annotation layer whenever pixels are read back.

mod gesture;
mod surface_ops;
mod undo;

use glam::Vec2;
use image::RgbaImage;
use redline_config::StrokeWidthConfig;

use crate::annotations::AnnotationLog;
use crate::history::HistoryStack;
use crate::raster::TiledSurface;
use crate::types::{BlendMode, Tool, ToolConfig, WidthClass};

/// Gesture in progress. Tool, width and color are frozen at press time.
#[derive(Debug, Clone)]
pub(crate) struct ActiveGesture {
    pub tool: Tool,
    pub width: f32,
    pub color: [f32; 4],
    pub mode: BlendMode,
    pub start: Vec2,
    pub last: Vec2,
    /// Brush/eraser path, starting with the press point
    pub points: Vec<Vec2>,
    /// Set once the pointer has moved (rectangle tool)
    pub moved: bool,
}

/// Annotation pipeline for one display buffer
pub struct AnnotationPipeline {
    /// Transparent annotation layer
    pub surface: TiledSurface,
    /// Display-resolution photo under the annotations
    pub(crate) base: RgbaImage,
    pub(crate) tool: ToolConfig,
    pub(crate) widths: StrokeWidthConfig,
    /// Gesture in progress (None when idle)
    pub(crate) gesture: Option<ActiveGesture>,
    /// Committed annotation records
    pub(crate) log: AnnotationLog,
    pub(crate) history: HistoryStack,
    /// Set by every committed mutation; cleared by the owner after export
    pub(crate) modified: bool,
}

impl AnnotationPipeline {
    /// Create a pipeline over a display-resolution photo
    pub fn new(base: RgbaImage, history_limit: usize, widths: StrokeWidthConfig) -> Self {
        let (width, height) = base.dimensions();
        Self {
            surface: TiledSurface::with_default_tile_size(width, height),
            base,
            tool: ToolConfig::default(),
            widths,
            gesture: None,
            log: AnnotationLog::new(),
            history: HistoryStack::new(history_limit),
            modified: false,
        }
    }

    /// Create a pipeline over a blank white photo
    pub fn blank(width: u32, height: u32, history_limit: usize) -> Self {
        let base = RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        Self::new(base, history_limit, StrokeWidthConfig::default())
    }

    /// Get the display buffer width
    pub fn width(&self) -> u32 {
        self.surface.surface().width
    }

    /// Get the display buffer height
    pub fn height(&self) -> u32 {
        self.surface.surface().height
    }

    /// Select the tool for the next gesture
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool.tool = tool;
    }

    /// Select the width class for the next gesture
    pub fn set_width(&mut self, width: WidthClass) {
        self.tool.width = width;
    }

    /// Set the paint color for the next gesture
    pub fn set_color(&mut self, color: [f32; 4]) {
        self.tool.color = color;
    }

    /// Current tool selection
    pub fn tool_config(&self) -> ToolConfig {
        self.tool
    }

    /// Width in display pixels the current width class resolves to
    pub fn resolved_width(&self) -> f32 {
        self.tool
            .width
            .resolve(self.width(), self.height(), &self.widths)
    }

    /// Committed annotation records
    pub fn annotations(&self) -> &AnnotationLog {
        &self.log
    }

    /// Whether anything was committed since the flag was last cleared
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn clear_modified(&mut self) {
        self.modified = false;
    }
}
