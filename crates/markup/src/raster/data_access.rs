//! Tile data access for snapshots and restores

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Get tile bounds in pixel coordinates
    ///
    /// Returns (x, y, width, height); edge tiles may be smaller than the tile size.
    pub fn get_tile_bounds(&self, coord: TileCoord) -> (u32, u32, u32, u32) {
        let x = coord.x * self.tile_size;
        let y = coord.y * self.tile_size;
        let width = self.tile_size.min(self.surface.width.saturating_sub(x));
        let height = self.tile_size.min(self.surface.height.saturating_sub(y));
        (x, y, width, height)
    }

    /// Get the pixel data of a tile, row-major
    pub fn get_tile_data(&self, coord: TileCoord) -> Vec<[u8; 4]> {
        let (x, y, width, height) = self.get_tile_bounds(coord);
        self.get_region_data(x, y, width, height)
    }

    /// Get pixel data for a rectangular region, clamped to surface bounds
    pub fn get_region_data(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<[u8; 4]> {
        let x_end = (x.saturating_add(width)).min(self.surface.width);
        let y_end = (y.saturating_add(height)).min(self.surface.height);
        if x >= x_end || y >= y_end {
            return Vec::new();
        }

        let pixels: &[[u8; 4]] = bytemuck::cast_slice(self.surface.as_bytes());
        let stride = self.surface.width as usize;
        let mut data = Vec::with_capacity(((x_end - x) * (y_end - y)) as usize);
        for row in y..y_end {
            let start = row as usize * stride;
            data.extend_from_slice(&pixels[start + x as usize..start + x_end as usize]);
        }
        data
    }

    /// Write previously captured tile data back and mark the tile dirty
    pub fn restore_tile_data(&mut self, coord: TileCoord, data: &[[u8; 4]]) {
        let (x, y, width, height) = self.get_tile_bounds(coord);
        if width == 0 || height == 0 {
            return;
        }
        if data.len() != (width * height) as usize {
            tracing::warn!(
                "restore_tile_data: tile ({}, {}) expects {} pixels, got {}",
                coord.x,
                coord.y,
                width * height,
                data.len()
            );
            return;
        }

        let stride = self.surface.width as usize;
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(self.surface.as_bytes_mut());
        for (row_index, row) in data.chunks_exact(width as usize).enumerate() {
            let start = (y as usize + row_index) * stride + x as usize;
            pixels[start..start + width as usize].copy_from_slice(row);
        }

        self.mark_dirty(x, y);
    }

    /// Tiles overlapping a pixel region
    pub fn tiles_in_region(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<TileCoord> {
        if width == 0 || height == 0 || x >= self.surface.width || y >= self.surface.height {
            return Vec::new();
        }
        let x_end = (x.saturating_add(width)).min(self.surface.width);
        let y_end = (y.saturating_add(height)).min(self.surface.height);

        let mut tiles = Vec::new();
        for ty in (y / self.tile_size)..=((y_end - 1) / self.tile_size) {
            for tx in (x / self.tile_size)..=((x_end - 1) / self.tile_size) {
                tiles.push(TileCoord { x: tx, y: ty });
            }
        }
        tiles
    }
}
