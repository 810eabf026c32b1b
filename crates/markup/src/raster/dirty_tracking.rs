//! Dirty tile tracking for incremental repaint

use tracing::debug;

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Mark a pixel as modified (marks containing tile dirty)
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.surface.width || y >= self.surface.height {
            return;
        }
        let tile_x = x / self.tile_size;
        let tile_y = y / self.tile_size;
        self.dirty_tiles.insert(TileCoord { x: tile_x, y: tile_y });
    }

    /// Mark a rectangular region as dirty
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let tiles_before = self.dirty_tiles.len();
        let tiles = self.tiles_in_region(x, y, w, h);
        self.dirty_tiles.extend(tiles);

        debug!(
            "mark_region_dirty: ({}, {}) {}x{} -> {} new tiles (total {})",
            x,
            y,
            w,
            h,
            self.dirty_tiles.len() - tiles_before,
            self.dirty_tiles.len()
        );
    }

    /// Get all dirty tiles (sorted) and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.dirty_tiles.drain().collect();
        tiles.sort();
        tiles
    }

    /// Check if any tiles are dirty
    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Get the number of dirty tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }

}
