//! Tiled annotation layer with dirty tracking and stroke rasterization

mod data_access;
mod dirty_tracking;
mod mask;
mod stroke;

use glam::Vec2;

use crate::annotations::Annotation;
use crate::constants::DEFAULT_TILE_SIZE;
use crate::surface::CpuSurface;
use crate::types::BlendMode;
use std::collections::HashSet;

pub use mask::CoverageMask;
pub use stroke::{
    rectangle_bounds, rectangle_coverage, segment_bounds, segment_coverage, stamp_segment,
    stroke_rectangle,
};

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Manages tiled access to an annotation surface with dirty tracking
pub struct TiledSurface {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
    /// Per-stroke coverage so overlapping segments of one stroke blend once
    mask: CoverageMask,
}

impl TiledSurface {
    /// Create a new transparent tiled surface with the given dimensions and tile size
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_x = width.div_ceil(tile_size);
        let tiles_y = height.div_ceil(tile_size);

        Self {
            surface: CpuSurface::new(width, height),
            tile_size,
            tiles_x,
            tiles_y,
            dirty_tiles: HashSet::new(),
            mask: CoverageMask::new(width, height),
        }
    }

    /// Create a new tiled surface with the default tile size
    pub fn with_default_tile_size(width: u32, height: u32) -> Self {
        Self::new(width, height, DEFAULT_TILE_SIZE)
    }

    /// Get the tile size
    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Get the number of tiles in x direction
    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    /// Get the number of tiles in y direction
    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// All tile coordinates, row-major
    pub fn all_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.tiles_y).flat_map(move |y| (0..self.tiles_x).map(move |x| TileCoord { x, y }))
    }

    /// Get the underlying surface for direct pixel access
    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Get mutable access to the underlying surface
    #[inline]
    pub fn surface_mut(&mut self) -> &mut CpuSurface {
        &mut self.surface
    }

    /// Start a new stroke: forget the coverage of the previous one
    pub fn begin_stroke(&mut self) {
        self.mask.reset();
    }

    /// Stamp a stroke segment (round caps) and mark the touched tiles dirty
    pub fn stamp_segment(
        &mut self,
        from: Vec2,
        to: Vec2,
        width: f32,
        color: [f32; 4],
        blend_mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        let result = stamp_segment(
            &mut self.surface,
            &mut self.mask,
            from,
            to,
            width,
            color,
            blend_mode,
        );
        if let Some((x, y, w, h)) = result {
            self.mark_region_dirty(x, y, w, h);
        }
        result
    }

    /// Stroke a rectangle outline and mark the touched tiles dirty
    pub fn stroke_rectangle(
        &mut self,
        corner_a: Vec2,
        corner_b: Vec2,
        width: f32,
        color: [f32; 4],
    ) -> Option<(u32, u32, u32, u32)> {
        let result = stroke_rectangle(&mut self.surface, corner_a, corner_b, width, color);
        if let Some((x, y, w, h)) = result {
            self.mark_region_dirty(x, y, w, h);
        }
        result
    }

    /// Draw a retained annotation the same way the live gesture drew it:
    /// a dot at the first point, then one segment per following point.
    pub fn draw_annotation(&mut self, annotation: &Annotation) {
        match annotation {
            Annotation::Stroke {
                points,
                width,
                color,
                mode,
            } => {
                let Some(&first) = points.first() else {
                    return;
                };
                self.begin_stroke();
                self.stamp_segment(first, first, *width, *color, *mode);
                for pair in points.windows(2) {
                    self.stamp_segment(pair[0], pair[1], *width, *color, *mode);
                }
            }
            Annotation::Rectangle {
                start,
                end,
                width,
                color,
            } => {
                self.stroke_rectangle(*start, *end, *width, *color);
            }
        }
    }

    /// Clear every annotation pixel to transparency
    pub fn clear(&mut self) {
        self.surface.clear([0, 0, 0, 0]);
        self.mask.reset();
        let tiles: Vec<TileCoord> = self.all_tiles().collect();
        self.dirty_tiles.extend(tiles);
    }
}
