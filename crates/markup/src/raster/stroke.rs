//! Stroke and rectangle rasterization onto the annotation layer

use glam::Vec2;
use tracing::debug;

use super::CoverageMask;
use crate::surface::CpuSurface;
use crate::types::BlendMode;

/// Anti-aliasing ramp: a pixel center half a pixel outside the ideal
/// shape gets zero coverage, half a pixel inside gets full coverage.
const AA_HALF_WIDTH: f32 = 0.5;

/// Coverage of a pixel center by a capsule (segment with round caps)
#[inline]
pub fn segment_coverage(point: Vec2, from: Vec2, to: Vec2, half_width: f32) -> f32 {
    let ab = to - from;
    let len_sq = ab.length_squared();
    let t = if len_sq > 0.0 {
        ((point - from).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let distance = point.distance(from + ab * t);
    (half_width + AA_HALF_WIDTH - distance).clamp(0.0, 1.0)
}

/// Coverage of a pixel center by an axis-aligned rectangle outline
/// centered on the edges (square corners)
#[inline]
pub fn rectangle_coverage(point: Vec2, min: Vec2, max: Vec2, half_width: f32) -> f32 {
    // Signed Chebyshev distance to the box: negative inside, positive outside
    let dx = (min.x - point.x).max(point.x - max.x);
    let dy = (min.y - point.y).max(point.y - max.y);
    let signed = dx.max(dy);
    (half_width + AA_HALF_WIDTH - signed.abs()).clamp(0.0, 1.0)
}

/// Pixel bounds (x, y, width, height) touched by a segment, clamped to the surface
pub fn segment_bounds(
    from: Vec2,
    to: Vec2,
    width: f32,
    surface_width: u32,
    surface_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let extent = width / 2.0 + AA_HALF_WIDTH + 1.0;
    clamp_bounds(
        from.min(to) - Vec2::splat(extent),
        from.max(to) + Vec2::splat(extent),
        surface_width,
        surface_height,
    )
}

/// Pixel bounds (x, y, width, height) touched by a rectangle outline
pub fn rectangle_bounds(
    corner_a: Vec2,
    corner_b: Vec2,
    width: f32,
    surface_width: u32,
    surface_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    segment_bounds(corner_a, corner_b, width, surface_width, surface_height)
}

fn clamp_bounds(
    min: Vec2,
    max: Vec2,
    surface_width: u32,
    surface_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let x_min = (min.x.floor().max(0.0) as u32).min(surface_width);
    let y_min = (min.y.floor().max(0.0) as u32).min(surface_height);
    let x_max = (max.x.ceil().max(0.0) as u32).min(surface_width);
    let y_max = (max.y.ceil().max(0.0) as u32).min(surface_height);

    // Check if completely outside
    if x_min >= x_max || y_min >= y_max {
        return None;
    }
    Some((x_min, y_min, x_max - x_min, y_max - y_min))
}

/// Stamp one segment of a stroke with round caps.
///
/// A zero-length segment stamps a dot. Coverage is tracked in `mask` so the
/// segments of one stroke join without double-blending; call
/// [`CoverageMask::reset`] between strokes.
///
/// Returns the bounding box of the affected region, or None if the segment
/// lies completely outside the surface.
pub fn stamp_segment(
    surface: &mut CpuSurface,
    mask: &mut CoverageMask,
    from: Vec2,
    to: Vec2,
    width: f32,
    color: [f32; 4],
    blend_mode: BlendMode,
) -> Option<(u32, u32, u32, u32)> {
    if width <= 0.0 {
        debug!("stamp_segment: skipped, width {:.2}", width);
        return None;
    }
    let (x, y, w, h) = segment_bounds(from, to, width, surface.width, surface.height)?;
    let half_width = width / 2.0;
    let strength = match blend_mode {
        BlendMode::Normal => color[3].clamp(0.0, 1.0),
        BlendMode::Erase => 1.0,
    };

    for py in y..y + h {
        for px in x..x + w {
            let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let coverage = segment_coverage(center, from, to, half_width) * strength;
            if coverage <= 0.0 {
                continue;
            }
            let Some(alpha) = mask.raise(px, py, coverage) else {
                continue;
            };
            match blend_mode {
                BlendMode::Normal => surface.blend_pixel(px, py, color, alpha),
                BlendMode::Erase => surface.erase_pixel(px, py, alpha),
            }
        }
    }

    Some((x, y, w, h))
}

/// Stroke an axis-aligned rectangle outline spanning two corners.
///
/// The outline is centered on the rectangle edges and drawn in one pass.
pub fn stroke_rectangle(
    surface: &mut CpuSurface,
    corner_a: Vec2,
    corner_b: Vec2,
    width: f32,
    color: [f32; 4],
) -> Option<(u32, u32, u32, u32)> {
    if width <= 0.0 {
        return None;
    }
    let (x, y, w, h) = rectangle_bounds(corner_a, corner_b, width, surface.width, surface.height)?;
    let min = corner_a.min(corner_b);
    let max = corner_a.max(corner_b);
    let half_width = width / 2.0;
    let strength = color[3].clamp(0.0, 1.0);

    for py in y..y + h {
        for px in x..x + w {
            let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
            let alpha = rectangle_coverage(center, min, max, half_width) * strength;
            if alpha > 0.0 {
                surface.blend_pixel(px, py, color, alpha);
            }
        }
    }

    Some((x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    #[test]
    fn test_segment_coverage() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        assert_eq!(segment_coverage(Vec2::new(5.0, 0.0), from, to, 2.0), 1.0);
        assert_eq!(segment_coverage(Vec2::new(5.0, 5.0), from, to, 2.0), 0.0);
        // Round cap beyond the end point
        assert_eq!(segment_coverage(Vec2::new(11.0, 0.0), from, to, 2.0), 1.0);
        let edge = segment_coverage(Vec2::new(5.0, 2.0), from, to, 2.0);
        assert!((edge - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rectangle_coverage() {
        let min = Vec2::new(10.0, 10.0);
        let max = Vec2::new(30.0, 20.0);
        // On an edge
        assert_eq!(rectangle_coverage(Vec2::new(20.0, 10.0), min, max, 2.0), 1.0);
        // Interior stays untouched
        assert_eq!(rectangle_coverage(Vec2::new(20.0, 15.0), min, max, 2.0), 0.0);
        // Square corner
        assert_eq!(rectangle_coverage(Vec2::new(11.5, 11.5), min, max, 2.0), 1.0);
        assert_eq!(rectangle_coverage(Vec2::new(8.5, 8.5), min, max, 2.0), 1.0);
    }

    #[test]
    fn test_dot_is_visible() {
        let mut surface = CpuSurface::new(32, 32);
        let mut mask = CoverageMask::new(32, 32);
        let p = Vec2::new(16.0, 16.0);
        let result = stamp_segment(&mut surface, &mut mask, p, p, 4.0, BLUE, BlendMode::Normal);
        assert!(result.is_some());
        assert_eq!(surface.get_pixel(15, 15), Some([0, 0, 255, 255]));
        assert_eq!(surface.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_overlapping_segments_blend_once() {
        let half_blue = [0.0, 0.0, 1.0, 0.5];
        let mut surface = CpuSurface::new(64, 16);
        let mut mask = CoverageMask::new(64, 16);

        // Many tiny segments over the same pixels
        let mut last = Vec2::new(8.0, 8.0);
        stamp_segment(&mut surface, &mut mask, last, last, 6.0, half_blue, BlendMode::Normal);
        for i in 1..40 {
            let next = Vec2::new(8.0 + i as f32, 8.0);
            stamp_segment(&mut surface, &mut mask, last, next, 6.0, half_blue, BlendMode::Normal);
            last = next;
        }

        let pixel = surface.get_pixel(20, 7).unwrap();
        assert!((pixel[3] as i32 - 128).abs() <= 1, "alpha {}", pixel[3]);
    }

    #[test]
    fn test_erase_clears_paint() {
        let mut surface = CpuSurface::new(32, 32);
        let mut mask = CoverageMask::new(32, 32);
        let a = Vec2::new(4.0, 16.0);
        let b = Vec2::new(28.0, 16.0);
        stamp_segment(&mut surface, &mut mask, a, b, 6.0, BLUE, BlendMode::Normal);
        mask.reset();
        stamp_segment(&mut surface, &mut mask, a, b, 12.0, BLUE, BlendMode::Erase);
        assert!(surface.is_transparent());
    }

    #[test]
    fn test_rectangle_clipped_to_surface() {
        let mut surface = CpuSurface::new(20, 20);
        let result = stroke_rectangle(
            &mut surface,
            Vec2::new(-10.0, -10.0),
            Vec2::new(10.0, 10.0),
            2.0,
            BLUE,
        );
        let (x, y, w, h) = result.unwrap();
        assert_eq!((x, y), (0, 0));
        assert!(x + w <= 20 && y + h <= 20);
        // Right edge of the rectangle is inside the surface
        assert_eq!(surface.get_pixel(9, 5), Some([0, 0, 255, 255]));
    }
}
