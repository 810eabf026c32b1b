//! Shared configuration for Redline
//!
//! This crate provides the single source of truth for display caps, history
//! depth, stroke width classes and export settings shared by the annotation
//! engine and every host that drives it.

use serde::{Deserialize, Serialize};

/// Default maximum display buffer width in pixels
pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 1280;

/// Default maximum display buffer height in pixels
pub const DEFAULT_MAX_DISPLAY_HEIGHT: u32 = 960;

/// Default number of undo levels kept per session
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Default JPEG quality used when re-encoding an export
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Width class divisors: stroke width = shorter display side / divisor
pub const DEFAULT_THIN_DIVISOR: f32 = 240.0;
pub const DEFAULT_MEDIUM_DIVISOR: f32 = 120.0;
pub const DEFAULT_THICK_DIVISOR: f32 = 60.0;

/// How annotations are reproduced at the source resolution on export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStrategy {
    /// Redraw every retained annotation record scaled by `1/s`
    #[default]
    Replay,
    /// Upscale the display-resolution annotation layer with a resampling filter
    Resample,
}

/// Resampling filter used when scaling raster data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Stroke width classes, expressed as divisors of the shorter display side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeWidthConfig {
    pub thin_divisor: f32,
    pub medium_divisor: f32,
    pub thick_divisor: f32,
    /// Lower bound for any resolved width, in display pixels
    pub min_width: f32,
}

impl Default for StrokeWidthConfig {
    fn default() -> Self {
        Self {
            thin_divisor: DEFAULT_THIN_DIVISOR,
            medium_divisor: DEFAULT_MEDIUM_DIVISOR,
            thick_divisor: DEFAULT_THICK_DIVISOR,
            min_width: 1.0,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub strategy: ExportStrategy,
    /// Forced output format extension (e.g. "png"); `None` keeps the source format
    pub format: Option<String>,
    pub jpeg_quality: u8,
    /// Filter for the `Resample` strategy
    pub resample: ResampleFilter,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            strategy: ExportStrategy::default(),
            format: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            resample: ResampleFilter::CatmullRom,
        }
    }
}

/// Editor configuration for one annotation session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Display buffer width cap in pixels
    pub max_display_width: u32,
    /// Display buffer height cap in pixels
    pub max_display_height: u32,
    /// Maximum undo levels (oldest evicted first)
    pub history_limit: usize,
    /// Filter used to downscale the photo into the display buffer
    pub display_filter: ResampleFilter,
    pub stroke_widths: StrokeWidthConfig,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            max_display_height: DEFAULT_MAX_DISPLAY_HEIGHT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            display_filter: ResampleFilter::default(),
            stroke_widths: StrokeWidthConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Create a config with the given display caps and defaults elsewhere
    pub fn with_display_caps(max_display_width: u32, max_display_height: u32) -> Self {
        Self {
            max_display_width,
            max_display_height,
            ..Default::default()
        }
    }

    /// History limit, never below one level
    pub fn effective_history_limit(&self) -> usize {
        self.history_limit.max(1)
    }
}
