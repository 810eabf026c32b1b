//! IPC message protocol for Redline
//!
//! Defines all message types exchanged between a UI host (toolbar, canvas
//! element, modal chrome) and the annotation engine.

mod commands;
mod error;
mod input;
mod messages;

pub use commands::*;
pub use error::IpcError;
pub use input::*;
pub use messages::*;

/// Serialize a message to JSON.
pub fn to_json<T: serde::Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a single UI message from JSON.
pub fn from_json(text: &str) -> Result<UiToEditor, IpcError> {
    serde_json::from_str(text).map_err(|e| IpcError::InvalidFormat(e.to_string()))
}

/// Parse a gesture script: a JSON array of UI messages, replayed in order.
pub fn parse_script(text: &str) -> Result<Vec<UiToEditor>, IpcError> {
    serde_json::from_str(text).map_err(|e| IpcError::InvalidFormat(e.to_string()))
}
