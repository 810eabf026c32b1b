//! Retained annotation records.
//!
//! Every committed gesture that produced geometry is kept as an
//! [`Annotation`] in insertion order next to the raster result. The export
//! compositor replays this list at the source resolution, so line weight and
//! placement stay exact regardless of how far the display was reduced.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::BlendMode;

/// One retained annotation, geometry in display pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    /// Brush or eraser path; the first point is the initial dot
    Stroke {
        points: Vec<Vec2>,
        width: f32,
        color: [f32; 4],
        mode: BlendMode,
    },
    /// Rectangle outline spanning two corners
    Rectangle {
        start: Vec2,
        end: Vec2,
        width: f32,
        color: [f32; 4],
    },
}

impl Annotation {
    /// Copy with positions multiplied per axis and widths by `width_factor`
    pub fn scaled(&self, axis_factors: Vec2, width_factor: f32) -> Annotation {
        match self {
            Annotation::Stroke {
                points,
                width,
                color,
                mode,
            } => Annotation::Stroke {
                points: points.iter().map(|p| *p * axis_factors).collect(),
                width: width * width_factor,
                color: *color,
                mode: *mode,
            },
            Annotation::Rectangle {
                start,
                end,
                width,
                color,
            } => Annotation::Rectangle {
                start: *start * axis_factors,
                end: *end * axis_factors,
                width: width * width_factor,
                color: *color,
            },
        }
    }

    /// Stroke width in the record's coordinate space
    pub fn width(&self) -> f32 {
        match self {
            Annotation::Stroke { width, .. } | Annotation::Rectangle { width, .. } => *width,
        }
    }

    pub fn is_erase(&self) -> bool {
        matches!(
            self,
            Annotation::Stroke {
                mode: BlendMode::Erase,
                ..
            }
        )
    }
}

/// Ordered, insertion-indexed list of annotations.
///
/// Records are shared behind `Arc` so history snapshots of the log are a
/// cheap copy of pointers.
#[derive(Debug, Clone, Default)]
pub struct AnnotationLog {
    records: Vec<Arc<Annotation>>,
}

impl AnnotationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its index
    pub fn append(&mut self, annotation: Annotation) -> usize {
        self.records.push(Arc::new(annotation));
        self.records.len() - 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.records.get(index).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Shared copy of the current records
    pub fn snapshot(&self) -> Vec<Arc<Annotation>> {
        self.records.clone()
    }

    /// Replace the records with a snapshot
    pub fn restore(&mut self, records: Vec<Arc<Annotation>>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(x: f32) -> Annotation {
        Annotation::Stroke {
            points: vec![Vec2::new(x, 10.0), Vec2::new(x + 5.0, 20.0)],
            width: 5.0,
            color: [1.0, 0.0, 0.0, 1.0],
            mode: BlendMode::Normal,
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut log = AnnotationLog::new();
        assert_eq!(log.append(stroke(1.0)), 0);
        assert_eq!(log.append(stroke(2.0)), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1), Some(&stroke(2.0)));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut log = AnnotationLog::new();
        log.append(stroke(1.0));
        let snapshot = log.snapshot();
        log.append(stroke(2.0));
        log.restore(snapshot);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_scaled_stroke() {
        let scaled = stroke(10.0).scaled(Vec2::splat(5.0), 5.0);
        match scaled {
            Annotation::Stroke { points, width, .. } => {
                assert_eq!(points[0], Vec2::new(50.0, 50.0));
                assert_eq!(width, 25.0);
            }
            _ => panic!("Expected stroke"),
        }
    }

    #[test]
    fn test_scaled_rectangle() {
        let rect = Annotation::Rectangle {
            start: Vec2::new(1.0, 2.0),
            end: Vec2::new(3.0, 4.0),
            width: 2.0,
            color: [0.0, 0.0, 0.0, 1.0],
        };
        let scaled = rect.scaled(Vec2::new(2.0, 3.0), 2.5);
        assert_eq!(scaled.width(), 5.0);
        assert!(!scaled.is_erase());
        match scaled {
            Annotation::Rectangle { start, end, .. } => {
                assert_eq!(start, Vec2::new(2.0, 6.0));
                assert_eq!(end, Vec2::new(6.0, 12.0));
            }
            _ => panic!("Expected rectangle"),
        }
    }
}
