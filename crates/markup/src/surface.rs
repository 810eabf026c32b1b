//! CPU surface for annotation - 8-bit straight-alpha RGBA storage

use image::{Rgba, RgbaImage};

/// An RGBA8 CPU surface
/// Stores pixels as straight (non-premultiplied) alpha, row-major
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    image: RgbaImage,
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image: RgbaImage::new(width, height),
        }
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(color);
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.image.get_pixel(x, y).0)
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.image.put_pixel(x, y, Rgba(color));
    }

    /// Blend a color onto an existing pixel ("over" with straight alpha)
    ///
    /// `alpha` is the effective source alpha (color alpha, coverage and
    /// opacity already folded in); the color's own alpha channel is ignored.
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], alpha: f32) {
        if x >= self.width || y >= self.height || alpha <= 0.0 {
            return;
        }
        let index = self.index(x, y);
        let raw: &mut [u8] = &mut self.image;
        let dst = &mut raw[index..index + 4];

        let src_alpha = alpha.min(1.0);
        let dst_alpha = dst[3] as f32 / 255.0;
        let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
        if out_alpha <= 0.0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }

        for c in 0..3 {
            let d = dst[c] as f32 / 255.0;
            let v = (color[c] * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
            dst[c] = to_u8(v);
        }
        dst[3] = to_u8(out_alpha);
    }

    /// Erase a pixel by reducing its alpha (destination-out compositing)
    /// The erase_amount (0-1) determines how much alpha is removed
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, erase_amount: f32) {
        if x >= self.width || y >= self.height || erase_amount <= 0.0 {
            return;
        }
        let index = self.index(x, y);
        let raw: &mut [u8] = &mut self.image;
        let dst = &mut raw[index..index + 4];

        let remaining = (1.0 - erase_amount).max(0.0);
        let alpha = to_u8(dst[3] as f32 / 255.0 * remaining);
        if alpha == 0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            dst[3] = alpha;
        }
    }

    /// Get raw pixel data (RGBA8, row-major)
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable raw pixel data
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Whether every pixel is fully transparent
    pub fn is_transparent(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Borrow the underlying image
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the underlying image
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
