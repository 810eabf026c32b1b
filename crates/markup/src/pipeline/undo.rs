//! Undo, redo and clear for the annotation pipeline

use tracing::debug;

use crate::history::Snapshot;

use super::AnnotationPipeline;

impl AnnotationPipeline {
    /// Capture tiles of a pixel region before they are modified
    pub(crate) fn capture_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        for coord in self.surface.tiles_in_region(x, y, width, height) {
            if self.history.needs_capture(coord) {
                let data = self.surface.get_tile_data(coord);
                self.history.capture(coord, data);
            }
        }
    }

    /// Put every tile captured by the open gesture back to its pre-gesture state
    pub(crate) fn restore_pending_tiles(&mut self) {
        if let Some(pending) = self.history.pending() {
            for (coord, data) in &pending.tiles {
                self.surface.restore_tile_data(*coord, data);
            }
        }
    }

    /// Current contents of the tiles a snapshot covers, plus the log
    fn counterpart(&self, snapshot: &Snapshot) -> Snapshot {
        let mut current = Snapshot::new(self.log.snapshot());
        for coord in snapshot.tiles.keys() {
            current.tiles.insert(*coord, self.surface.get_tile_data(*coord));
        }
        current
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        for (coord, data) in &snapshot.tiles {
            self.surface.restore_tile_data(*coord, data);
        }
        self.log.restore(snapshot.annotations);
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the number of undo levels available
    pub fn undo_count(&self) -> usize {
        self.history.undo_len()
    }

    /// Undo the last committed gesture or clear
    ///
    /// Returns true if an undo was performed, false if no undo available
    pub fn undo(&mut self) -> bool {
        self.release();
        let Some(entry) = self.history.pop_undo() else {
            debug!("Undo: no entries available");
            return false;
        };
        debug!("Undo: restoring {} tiles", entry.tiles.len());

        let redo = self.counterpart(&entry);
        self.apply_snapshot(entry);
        self.history.push_redo(redo);
        self.modified = true;
        true
    }

    /// Reapply the most recently undone entry
    ///
    /// Returns true if a redo was performed, false if no redo available
    pub fn redo(&mut self) -> bool {
        self.release();
        let Some(entry) = self.history.pop_redo() else {
            debug!("Redo: no entries available");
            return false;
        };
        debug!("Redo: restoring {} tiles", entry.tiles.len());

        let undo = self.counterpart(&entry);
        self.apply_snapshot(entry);
        self.history.push_undo(undo);
        self.modified = true;
        true
    }

    /// Remove every annotation, revealing the original photo
    ///
    /// Recorded as one undoable step.
    pub fn clear_all(&mut self) {
        self.release();
        self.history.begin(self.log.snapshot());

        // Tiles that are already empty stay unchanged and need no capture
        let tiles: Vec<_> = self.surface.all_tiles().collect();
        for coord in tiles {
            let data = self.surface.get_tile_data(coord);
            if data.iter().any(|p| p[3] != 0) {
                self.history.capture(coord, data);
            }
        }

        self.surface.clear();
        self.log.clear();
        self.history.commit();
        self.modified = true;
        debug!("clear_all: annotation layer cleared");
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::types::Tool;

    fn stroke(pipeline: &mut AnnotationPipeline, y: f32) {
        pipeline.press(Vec2::new(10.0, y));
        pipeline.drag(Vec2::new(390.0, y));
        pipeline.release();
    }

    fn layer(pipeline: &AnnotationPipeline) -> Vec<u8> {
        pipeline.surface.surface().as_bytes().to_vec()
    }

    #[test]
    fn test_undo_restores_exact_pixels() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 30);
        stroke(&mut pipeline, 50.0);
        let after_first = layer(&pipeline);

        stroke(&mut pipeline, 52.0);
        assert_ne!(layer(&pipeline), after_first);

        assert!(pipeline.undo());
        assert_eq!(layer(&pipeline), after_first);
        assert_eq!(pipeline.annotations().len(), 1);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 30);
        stroke(&mut pipeline, 50.0);
        stroke(&mut pipeline, 150.0);
        let full = layer(&pipeline);

        assert!(pipeline.undo());
        assert!(pipeline.undo());
        assert!(pipeline.surface.surface().is_transparent());
        assert!(!pipeline.undo());

        assert!(pipeline.redo());
        assert!(pipeline.redo());
        assert!(!pipeline.redo());
        assert_eq!(layer(&pipeline), full);
        assert_eq!(pipeline.annotations().len(), 2);
    }

    #[test]
    fn test_three_strokes_two_undos_one_stroke() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 30);
        stroke(&mut pipeline, 50.0);
        let after_first = layer(&pipeline);
        stroke(&mut pipeline, 100.0);
        stroke(&mut pipeline, 150.0);

        pipeline.undo();
        pipeline.undo();
        assert_eq!(layer(&pipeline), after_first);

        stroke(&mut pipeline, 250.0);
        assert!(!pipeline.can_redo());
        assert_eq!(pipeline.undo_count(), 2);
        assert_eq!(pipeline.annotations().len(), 2);
    }

    #[test]
    fn test_clear_all_is_undoable() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 30);
        pipeline.set_tool(Tool::Rectangle);
        pipeline.press(Vec2::new(20.0, 20.0));
        pipeline.drag(Vec2::new(380.0, 280.0));
        pipeline.release();
        let drawn = layer(&pipeline);

        pipeline.clear_all();
        assert!(pipeline.surface.surface().is_transparent());
        assert!(pipeline.annotations().is_empty());

        assert!(pipeline.undo());
        assert_eq!(layer(&pipeline), drawn);
        assert_eq!(pipeline.annotations().len(), 1);
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 3);
        for i in 0..5 {
            stroke(&mut pipeline, 20.0 + i as f32 * 50.0);
        }
        assert_eq!(pipeline.undo_count(), 3);
        for _ in 0..3 {
            assert!(pipeline.undo());
        }
        assert!(!pipeline.undo());
        // The two oldest strokes can no longer be undone
        assert_eq!(pipeline.annotations().len(), 2);
    }

    #[test]
    fn test_undo_closes_open_gesture() {
        let mut pipeline = AnnotationPipeline::blank(400, 300, 30);
        pipeline.press(Vec2::new(10.0, 10.0));
        pipeline.drag(Vec2::new(100.0, 10.0));
        assert!(pipeline.undo());
        assert!(!pipeline.is_drawing());
        assert!(pipeline.surface.surface().is_transparent());
    }
}
