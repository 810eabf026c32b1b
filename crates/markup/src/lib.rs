//! Redline markup engine - raster annotation of photographs
//!
//! This crate provides everything needed to mark up a photo at a
//! screen-reduced resolution and export the result at the photo's
//! original resolution:
//! - [`mapping`] - Pointer-to-buffer coordinate mapping and viewport scale
//! - [`surface`] - RGBA8 CPU surface with paint/erase compositing
//! - [`raster`] - Tiled annotation layer, stroke and rectangle rasterization
//! - [`history`] - Bounded undo/redo stacks of copy-on-write tile snapshots
//! - [`annotations`] - Ordered log of retained stroke/rectangle records
//! - [`pipeline`] - Tool state machine driving the surface and history
//! - [`compositor`] - Full-resolution export and encoding
//! - [`session`] - One editing session with event listeners
//! - [`bridge`] - Applies IPC messages to a session

pub mod annotations;
pub mod bridge;
pub mod compositor;
pub mod constants;
pub mod error;
pub mod history;
pub mod mapping;
pub mod pipeline;
pub mod raster;
pub mod session;
pub mod source;
pub mod surface;
pub mod types;

pub use annotations::*;
pub use bridge::EditorBridge;
pub use compositor::{ExportRequest, ExportedImage, compose};
pub use constants::*;
pub use error::*;
pub use history::{HistoryStack, Snapshot};
pub use mapping::*;
pub use pipeline::AnnotationPipeline;
pub use raster::{TileCoord, TiledSurface};
pub use session::*;
pub use source::SourceImage;
pub use surface::CpuSurface;
pub use types::*;
