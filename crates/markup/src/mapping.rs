//! Coordinate mapping between viewport, display buffer and source pixels.

use glam::Vec2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Layout not ready: element rect is {width}x{height}")]
    LayoutNotReady { width: f32, height: f32 },
}

/// Rendered bounding box of the canvas element in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the element has been laid out with a usable size
    pub fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Convert a viewport position to backing-store pixel coordinates.
///
/// Compensates for the rendered element size differing from the buffer's
/// pixel grid (CSS scaling, high-density displays).
pub fn client_to_buffer(
    client: Vec2,
    rect: &ClientRect,
    buffer_width: u32,
    buffer_height: u32,
) -> Result<Vec2, MappingError> {
    if !rect.is_laid_out() {
        return Err(MappingError::LayoutNotReady {
            width: rect.width,
            height: rect.height,
        });
    }
    Ok(Vec2::new(
        (client.x - rect.left) * buffer_width as f32 / rect.width,
        (client.y - rect.top) * buffer_height as f32 / rect.height,
    ))
}

/// Inverse of [`client_to_buffer`].
pub fn buffer_to_client(
    buffer: Vec2,
    rect: &ClientRect,
    buffer_width: u32,
    buffer_height: u32,
) -> Option<Vec2> {
    if buffer_width == 0 || buffer_height == 0 || !rect.is_laid_out() {
        return None;
    }
    Some(Vec2::new(
        rect.left + buffer.x * rect.width / buffer_width as f32,
        rect.top + buffer.y * rect.height / buffer_height as f32,
    ))
}

/// Display-to-source scale, computed once per session.
///
/// `s = min(max_w / natural_w, max_h / natural_h, 1)` and the display
/// buffer is `round(natural * s)` on each axis, never upscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportScale {
    scale: f32,
    natural: (u32, u32),
    display: (u32, u32),
}

impl ViewportScale {
    pub fn compute(natural_width: u32, natural_height: u32, max_width: u32, max_height: u32) -> Self {
        let natural_width = natural_width.max(1);
        let natural_height = natural_height.max(1);
        let sx = max_width.max(1) as f64 / natural_width as f64;
        let sy = max_height.max(1) as f64 / natural_height as f64;
        let scale = sx.min(sy).min(1.0);

        let display_width = ((natural_width as f64 * scale).round() as u32).max(1);
        let display_height = ((natural_height as f64 * scale).round() as u32).max(1);

        Self {
            scale: scale as f32,
            natural: (natural_width, natural_height),
            display: (display_width, display_height),
        }
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn natural_size(&self) -> (u32, u32) {
        self.natural
    }

    #[inline]
    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    /// Whether the display buffer is smaller than the source
    pub fn is_downscaled(&self) -> bool {
        self.display != self.natural
    }

    /// Per-axis display-to-natural factors.
    ///
    /// These differ from `1/s` only by the rounding of the display size and
    /// keep image edges aligned exactly.
    pub fn axis_factors(&self) -> Vec2 {
        Vec2::new(
            self.natural.0 as f32 / self.display.0 as f32,
            self.natural.1 as f32 / self.display.1 as f32,
        )
    }

    /// Map a display-buffer point to source pixels
    pub fn display_to_natural(&self, point: Vec2) -> Vec2 {
        point * self.axis_factors()
    }

    /// Map a display-pixel length (stroke width) to source pixels
    pub fn width_to_natural(&self, width: f32) -> f32 {
        width / self.scale
    }
}
