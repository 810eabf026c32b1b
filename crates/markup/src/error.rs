//! Error types for the markup engine.

use thiserror::Error;

/// Errors raised while opening or driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Source image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("Session is closed")]
    Closed,

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl SessionError {
    /// Caller-facing category for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Decode(_)
            | SessionError::UnsupportedFormat(_)
            | SessionError::EmptyImage { .. } => ErrorKind::DecodeFailure,
            SessionError::ExportInProgress | SessionError::Export(_) | SessionError::Closed => {
                ErrorKind::ExportFailure
            }
        }
    }
}

/// Errors raised by the export compositor. The session stays editable.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to redraw the original image: {0}")]
    Decode(String),

    #[error("Failed to encode output: {0}")]
    Encode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Export worker failed: {0}")]
    Worker(String),
}

/// Error categories surfaced to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DecodeFailure,
    ExportFailure,
}

impl ErrorKind {
    /// Stable code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::ExportFailure => "export_failure",
        }
    }
}
