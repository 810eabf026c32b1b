//! Surface operations for the annotation pipeline

use image::{Pixel, RgbaImage, imageops};

use crate::raster::TileCoord;

use super::AnnotationPipeline;

impl AnnotationPipeline {
    /// Take dirty tiles for presentation
    ///
    /// Returns the list of tile coordinates that have been modified
    /// since the last call. The dirty flags are cleared.
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.surface.take_dirty_tiles()
    }

    /// Check if there are any dirty tiles
    pub fn has_dirty_tiles(&self) -> bool {
        self.surface.has_dirty_tiles()
    }

    /// Get tile bounds in pixel coordinates
    ///
    /// Returns (x, y, width, height) for the given tile.
    pub fn get_tile_bounds(&self, coord: TileCoord) -> (u32, u32, u32, u32) {
        self.surface.get_tile_bounds(coord)
    }

    /// Get the tile size
    pub fn tile_size(&self) -> u32 {
        self.surface.tile_size()
    }

    /// Display-resolution photo under the annotations
    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Annotation layer alone (transparent where nothing is drawn)
    pub fn annotation_layer(&self) -> &RgbaImage {
        self.surface.surface().image()
    }

    /// Photo with annotations composited on top, at display resolution
    pub fn composite_display(&self) -> RgbaImage {
        let mut out = self.base.clone();
        imageops::overlay(&mut out, self.annotation_layer(), 0, 0);
        out
    }

    /// Composite of a pixel region, clamped to the buffer
    ///
    /// Used to refresh just the dirty tiles of a presented image.
    pub fn composite_region(&self, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        let mut out = imageops::crop_imm(&self.base, x, y, width, height).to_image();
        let layer = imageops::crop_imm(self.annotation_layer(), x, y, width, height).to_image();
        imageops::overlay(&mut out, &layer, 0, 0);
        out
    }

    /// Get a single composited pixel
    ///
    /// Returns None if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let mark = self.surface.surface().get_pixel(x, y)?;
        let mut pixel = *self.base.get_pixel(x, y);
        pixel.blend(&image::Rgba(mark));
        Some(pixel.0)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::types::Tool;

    #[test]
    fn test_dirty_tiles_after_stroke() {
        let mut pipeline = AnnotationPipeline::blank(256, 256, 10);
        pipeline.press(Vec2::new(100.0, 100.0));
        pipeline.release();

        let dirty = pipeline.take_dirty_tiles();
        assert_eq!(dirty, vec![TileCoord { x: 0, y: 0 }]);
        assert!(!pipeline.has_dirty_tiles());
        assert_eq!(pipeline.get_tile_bounds(dirty[0]), (0, 0, 128, 128));
    }

    #[test]
    fn test_composite_shows_photo_and_marks() {
        let mut pipeline = AnnotationPipeline::blank(200, 100, 10);
        pipeline.set_color([0.0, 0.0, 1.0, 1.0]);
        pipeline.press(Vec2::new(50.5, 50.5));
        pipeline.release();

        let composite = pipeline.composite_display();
        assert_eq!(composite.get_pixel(50, 50).0, [0, 0, 255, 255]);
        assert_eq!(composite.get_pixel(150, 50).0, [255, 255, 255, 255]);
        assert_eq!(pipeline.get_pixel(50, 50), Some([0, 0, 255, 255]));
        assert_eq!(pipeline.get_pixel(150, 50), Some([255, 255, 255, 255]));
        assert_eq!(pipeline.get_pixel(200, 50), None);
        // Base photo untouched
        assert_eq!(pipeline.base().get_pixel(50, 50).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_eraser_reveals_photo() {
        let mut pipeline = AnnotationPipeline::blank(200, 100, 10);
        pipeline.press(Vec2::new(20.0, 50.5));
        pipeline.drag(Vec2::new(180.0, 50.5));
        pipeline.release();
        assert_eq!(pipeline.get_pixel(100, 50), Some([255, 0, 0, 255]));

        pipeline.set_tool(Tool::Eraser);
        pipeline.press(Vec2::new(100.5, 10.0));
        pipeline.drag(Vec2::new(100.5, 90.0));
        pipeline.release();
        assert_eq!(pipeline.get_pixel(100, 50), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_composite_region_clamped() {
        let mut pipeline = AnnotationPipeline::blank(200, 100, 10);
        pipeline.press(Vec2::new(190.5, 90.5));
        pipeline.release();

        let region = pipeline.composite_region(180, 80, 64, 64);
        assert_eq!(region.dimensions(), (20, 20));
        assert_eq!(region.get_pixel(10, 10).0, [255, 0, 0, 255]);
    }
}
