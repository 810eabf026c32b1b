//! Bounded undo/redo history of annotation-layer snapshots

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::annotations::Annotation;
use crate::raster::TileCoord;

/// Annotation-layer state captured before a mutation.
///
/// Tiles are captured copy-on-write: a tile is recorded just before its
/// first modification, so tiles absent from the map were never changed and
/// the snapshot still describes the whole layer.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Captured tile data (tile coord -> pixel data)
    pub tiles: HashMap<TileCoord, Vec<[u8; 4]>>,
    /// Annotation records at capture time
    pub annotations: Vec<Arc<Annotation>>,
}

impl Snapshot {
    pub fn new(annotations: Vec<Arc<Annotation>>) -> Self {
        Self {
            tiles: HashMap::new(),
            annotations,
        }
    }

    /// Approximate pixel memory held by this snapshot
    pub fn memory_size(&self) -> usize {
        self.tiles.values().map(|t| t.len() * 4).sum()
    }
}

/// Undo stack (most recent at back, bounded) and redo stack.
pub struct HistoryStack {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    /// Snapshot of the gesture in progress
    pending: Option<Snapshot>,
    limit: usize,
}

impl HistoryStack {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            pending: None,
            limit: limit.max(1),
        }
    }

    /// Open a snapshot for a new gesture. A fresh edit discards redo.
    pub fn begin(&mut self, annotations: Vec<Arc<Annotation>>) {
        if self.pending.is_some() {
            debug!("HistoryStack::begin: replacing an uncommitted snapshot");
        }
        self.pending = Some(Snapshot::new(annotations));
        self.redo.clear();
    }

    /// Whether a tile must be captured before it is modified
    pub fn needs_capture(&self, coord: TileCoord) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.tiles.contains_key(&coord))
    }

    /// Record a tile's pre-modification contents
    pub fn capture(&mut self, coord: TileCoord, data: Vec<[u8; 4]>) {
        if let Some(pending) = self.pending.as_mut() {
            pending.tiles.entry(coord).or_insert(data);
        }
    }

    /// The open gesture snapshot
    pub fn pending(&self) -> Option<&Snapshot> {
        self.pending.as_ref()
    }

    /// Push the open snapshot onto the undo stack
    ///
    /// Returns false if no gesture was open.
    pub fn commit(&mut self) -> bool {
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        debug!(
            "HistoryStack::commit: {} tiles ({} bytes)",
            snapshot.tiles.len(),
            snapshot.memory_size()
        );
        self.redo.clear();
        self.push_undo(snapshot);
        true
    }

    /// Push onto the undo stack, evicting the oldest entries beyond the limit
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }

    pub fn pop_undo(&mut self) -> Option<Snapshot> {
        self.undo.pop_back()
    }

    pub fn push_redo(&mut self, snapshot: Snapshot) {
        self.redo.push(snapshot);
    }

    pub fn pop_redo(&mut self) -> Option<Snapshot> {
        self.redo.pop()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: u32) -> TileCoord {
        TileCoord { x, y: 0 }
    }

    #[test]
    fn test_commit_and_pop() {
        let mut history = HistoryStack::new(10);
        history.begin(Vec::new());
        assert!(history.needs_capture(tile(0)));
        history.capture(tile(0), vec![[1, 2, 3, 4]]);
        assert!(!history.needs_capture(tile(0)));
        assert!(history.commit());

        assert!(history.can_undo());
        let snapshot = history.pop_undo().unwrap();
        assert_eq!(snapshot.tiles[&tile(0)], vec![[1, 2, 3, 4]]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_first_capture_wins() {
        let mut history = HistoryStack::new(10);
        history.begin(Vec::new());
        history.capture(tile(0), vec![[1, 1, 1, 1]]);
        history.capture(tile(0), vec![[9, 9, 9, 9]]);
        assert_eq!(history.pending().unwrap().tiles[&tile(0)], vec![[1, 1, 1, 1]]);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = HistoryStack::new(3);
        for i in 0..5u32 {
            history.begin(Vec::new());
            history.capture(tile(i), vec![[i as u8, 0, 0, 0]]);
            history.commit();
        }
        assert_eq!(history.undo_len(), 3);
        let newest = history.pop_undo().unwrap();
        assert!(newest.tiles.contains_key(&tile(4)));
        history.pop_undo();
        let oldest = history.pop_undo().unwrap();
        assert!(oldest.tiles.contains_key(&tile(2)));
    }

    #[test]
    fn test_begin_clears_redo() {
        let mut history = HistoryStack::new(10);
        history.push_redo(Snapshot::default());
        assert!(history.can_redo());
        history.begin(Vec::new());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_no_capture_without_gesture() {
        let mut history = HistoryStack::new(10);
        assert!(!history.needs_capture(tile(0)));
        history.capture(tile(0), vec![]);
        assert!(!history.commit());
        assert!(!history.can_undo());
    }
}
