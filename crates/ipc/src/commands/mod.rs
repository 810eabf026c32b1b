//! Command types for IPC messages.

mod tool;

pub use tool::*;

use serde::{Deserialize, Serialize};

/// Explicit user actions on the editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EditCommand {
    /// Undo the last gesture
    Undo,
    /// Redo the last undone gesture
    Redo,
    /// Remove every annotation (undoable)
    Clear,
    /// Export at source resolution; `format` overrides the source format
    Save {
        #[serde(default)]
        format: Option<String>,
    },
    /// Close the session without saving
    Cancel,
}
