/// Default tile size for the annotation layer.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Movement below this distance (display pixels) does not extend a stroke.
pub const MIN_SEGMENT_LENGTH: f32 = 0.001;

/// Base name used when the source carries no file name.
pub const DEFAULT_BASE_NAME: &str = "image";

/// Suffix appended to the base name of an exported file.
pub const EDITED_SUFFIX: &str = "-edited";

/// Color used by the eraser; only its coverage matters.
pub const ERASE_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
