//! Main IPC message enums for communication between the UI host and the engine.

use serde::{Deserialize, Serialize};

use crate::commands::{EditCommand, ToolCommand};
use crate::input::{ElementRect, PointerEvent};

/// Messages from the annotation engine to the UI host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorToUi {
    /// Session opened; the canvas element should be sized to the display buffer
    Opened {
        natural_width: u32,
        natural_height: u32,
        display_width: u32,
        display_height: u32,
    },

    /// Undo/redo availability changed
    HistoryChanged { can_undo: bool, can_redo: bool },

    /// Export finished; `data` is the encoded image
    Saved {
        mime_type: String,
        file_name: String,
        data: Vec<u8>,
    },

    /// Decode or export failure
    Error { code: String, message: String },

    /// Session ended without saving
    Closed,
}

/// Messages from the UI host to the annotation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEditor {
    /// Pointer/touch input in viewport coordinates
    Pointer(PointerEvent),

    /// Canvas element was laid out or resized
    Layout(ElementRect),

    /// Tool, width or color selection
    ToolCommand(ToolCommand),

    /// Undo, redo, clear, save, cancel
    EditCommand(EditCommand),
}
