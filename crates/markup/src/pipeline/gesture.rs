//! Tool state machine: press, drag, release and cancel

use glam::Vec2;
use tracing::debug;

use crate::annotations::Annotation;
use crate::constants::{ERASE_COLOR, MIN_SEGMENT_LENGTH};
use crate::raster::{rectangle_bounds, segment_bounds};
use crate::types::{BlendMode, Tool};

use super::{ActiveGesture, AnnotationPipeline};

impl AnnotationPipeline {
    /// Begin a gesture at a display-buffer point
    ///
    /// Opens a history snapshot. Brush and eraser stamp a dot at the press
    /// point so a tap leaves a mark; the rectangle tool only remembers it.
    /// A press while a gesture is open releases that gesture first.
    pub fn press(&mut self, point: Vec2) {
        if self.gesture.is_some() {
            debug!("press: gesture still open, releasing it first");
            self.release();
        }

        let mode = self.tool.blend_mode();
        let color = match mode {
            BlendMode::Erase => ERASE_COLOR,
            BlendMode::Normal => self.tool.color,
        };
        let gesture = ActiveGesture {
            tool: self.tool.tool,
            width: self.resolved_width(),
            color,
            mode,
            start: point,
            last: point,
            points: vec![point],
            moved: false,
        };
        debug!(
            "press: {:?} at ({:.1}, {:.1}), width={:.2}",
            gesture.tool, point.x, point.y, gesture.width
        );

        self.history.begin(self.log.snapshot());
        self.surface.begin_stroke();

        if gesture.tool != Tool::Rectangle {
            self.draw_segment(point, point, gesture.width, gesture.color, gesture.mode);
        }
        self.gesture = Some(gesture);
    }

    /// Continue the open gesture to a new point
    ///
    /// Returns false if no gesture is open or the point was ignored.
    pub fn drag(&mut self, point: Vec2) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            debug!("drag: no active gesture, ignoring");
            return false;
        };

        match gesture.tool {
            Tool::Brush | Tool::Eraser => {
                if gesture.last.distance(point) < MIN_SEGMENT_LENGTH {
                    return false;
                }
                let (from, width, color, mode) =
                    (gesture.last, gesture.width, gesture.color, gesture.mode);
                gesture.last = point;
                gesture.points.push(point);
                self.draw_segment(from, point, width, color, mode);
            }
            Tool::Rectangle => {
                gesture.last = point;
                gesture.moved = true;
                let (start, width, color) = (gesture.start, gesture.width, gesture.color);
                self.draw_rectangle_preview(start, point, width, color);
            }
        }
        true
    }

    /// End the open gesture, keeping what was drawn
    ///
    /// Returns false if no gesture was open.
    pub fn release(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };

        let record = match gesture.tool {
            Tool::Brush | Tool::Eraser => Some(Annotation::Stroke {
                points: gesture.points,
                width: gesture.width,
                color: gesture.color,
                mode: gesture.mode,
            }),
            Tool::Rectangle if gesture.moved => Some(Annotation::Rectangle {
                start: gesture.start,
                end: gesture.last,
                width: gesture.width,
                color: gesture.color,
            }),
            Tool::Rectangle => None,
        };
        if let Some(record) = record {
            let index = self.log.append(record);
            debug!("release: recorded annotation {}", index);
        }

        self.history.commit();
        self.modified = true;
        true
    }

    /// Pointer cancel ends the gesture exactly like a release
    pub fn cancel(&mut self) -> bool {
        self.release()
    }

    /// Check if a gesture is currently in progress
    pub fn is_drawing(&self) -> bool {
        self.gesture.is_some()
    }

    fn draw_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4], mode: BlendMode) {
        let surface = self.surface.surface();
        if let Some((x, y, w, h)) = segment_bounds(from, to, width, surface.width, surface.height) {
            self.capture_region(x, y, w, h);
        }
        self.surface.stamp_segment(from, to, width, color, mode);
    }

    /// Put back every tile touched so far, then draw the outline afresh
    fn draw_rectangle_preview(&mut self, start: Vec2, end: Vec2, width: f32, color: [f32; 4]) {
        self.restore_pending_tiles();
        let surface = self.surface.surface();
        if let Some((x, y, w, h)) = rectangle_bounds(start, end, width, surface.width, surface.height)
        {
            self.capture_region(x, y, w, h);
        }
        self.surface.stroke_rectangle(start, end, width, color);
    }
}
