//! Boundary drag on the timeline: idle -> dragging -> committing -> idle,
//! with a rollback to the pre-drag bounds if the commit fails.
//!
//! The store is updated live while dragging. A segment with a commit in
//! flight cannot be dragged again until that commit resolves.

use std::collections::HashMap;
use crate::canvas::segment_renderer::Boundary;
use crate::segments::edit::BoundsBody;
use crate::segments::store::SegmentStore;
use crate::types::{Notice, Segment, SegmentId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    id: SegmentId,
    boundary: Boundary,
    original: (f64, f64),
}

/// An update call to issue after a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateRequest {
    pub id: SegmentId,
    pub server_id: i64,
    pub body: BoundsBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommitOutcome {
    Committed { id: SegmentId, onset: f64, offset: f64 },
    Reverted { id: SegmentId, notice: Notice },
    /// No commit was pending for this segment.
    Stale,
}

#[derive(Clone, Debug)]
pub struct SegmentDragHandler {
    min_separation: f64,
    active: Option<ActiveDrag>,
    /// Pre-drag bounds of every segment with a commit in flight.
    pending: HashMap<SegmentId, (f64, f64)>,
}

impl SegmentDragHandler {
    pub fn new(min_separation: f64) -> Self {
        Self { min_separation, active: None, pending: HashMap::new() }
    }

    pub fn phase(&self, id: SegmentId) -> DragPhase {
        if self.active.map_or(false, |a| a.id == id) {
            DragPhase::Dragging
        } else if self.pending.contains_key(&id) {
            DragPhase::Committing
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_committing(&self, id: SegmentId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Start dragging a boundary. Only server segments in the idle phase
    /// qualify.
    pub fn begin(&mut self, store: &SegmentStore, id: SegmentId, boundary: Boundary) -> bool {
        if self.active.is_some() || self.phase(id) != DragPhase::Idle {
            log::debug!("Drag on {id:?} refused: not idle");
            return false;
        }
        let Some(seg) = store.get(id) else { return false };
        if id.is_local() || store.is_deleting(id) {
            return false;
        }
        self.active = Some(ActiveDrag { id, boundary, original: (seg.onset, seg.offset) });
        true
    }

    /// Move the dragged boundary to time `t`, clamped to the recording and
    /// kept at least the minimum separation from the opposite boundary.
    pub fn update(&mut self, store: &mut SegmentStore, t: f64, duration: f64) -> bool {
        let Some(drag) = self.active else { return false };
        let Some(seg) = store.get(drag.id) else {
            self.active = None;
            return false;
        };
        let (onset, offset) = clamp_boundary(seg, drag.boundary, t, duration, self.min_separation);
        store.set_bounds(drag.id, onset, offset)
    }

    /// Pointer released. Returns the update to send, or `None` if the bounds
    /// did not change.
    pub fn finish(&mut self, store: &SegmentStore) -> Option<UpdateRequest> {
        let drag = self.active.take()?;
        let seg = store.get(drag.id)?;
        if (seg.onset, seg.offset) == drag.original {
            return None;
        }
        let server_id = drag.id.server_id()?;
        self.pending.insert(drag.id, drag.original);
        log::info!("Updating segment {server_id} to {:.3}-{:.3}s", seg.onset, seg.offset);
        Some(UpdateRequest {
            id: drag.id,
            server_id,
            body: BoundsBody { onset: seg.onset, offset: seg.offset },
        })
    }

    /// Abandon the current drag and restore its original bounds.
    pub fn cancel(&mut self, store: &mut SegmentStore) -> bool {
        let Some(drag) = self.active.take() else { return false };
        rollback(store, drag.id, drag.original);
        true
    }

    /// Apply the server's answer to a pending update.
    pub fn resolve<E: std::fmt::Display>(
        &mut self,
        store: &mut SegmentStore,
        id: SegmentId,
        result: Result<Segment, E>,
    ) -> CommitOutcome {
        let Some(original) = self.pending.remove(&id) else {
            return CommitOutcome::Stale;
        };
        match result {
            Ok(confirmed) => {
                store.set_bounds(id, confirmed.onset, confirmed.offset);
                CommitOutcome::Committed { id, onset: confirmed.onset, offset: confirmed.offset }
            }
            Err(e) => {
                log::error!("Segment update failed, reverting: {e}");
                rollback(store, id, original);
                CommitOutcome::Reverted { id, notice: Notice::error(format!("Could not save segment: {e}")) }
            }
        }
    }
}

/// Restore a segment's bounds to a known-good pair.
pub fn rollback(store: &mut SegmentStore, id: SegmentId, original: (f64, f64)) {
    store.set_bounds(id, original.0, original.1);
}

/// New `(onset, offset)` after moving `boundary` to `t`.
pub fn clamp_boundary(seg: &Segment, boundary: Boundary, t: f64, duration: f64, min_sep: f64) -> (f64, f64) {
    let t = crate::viewport::clamp_time(t, duration);
    match boundary {
        Boundary::Onset => {
            let onset = t.min(seg.offset - min_sep).max(0.0);
            (onset, seg.offset)
        }
        Boundary::Offset => {
            let offset = t.max(seg.onset + min_sep).min(duration);
            (seg.onset, offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(id: i64, onset: f64, offset: f64) -> SegmentStore {
        let mut store = SegmentStore::new();
        store.merge(vec![Segment { id: SegmentId::Server(id), onset, offset, name: None, notes: None }]);
        store
    }

    fn bounds(store: &SegmentStore, id: SegmentId) -> (f64, f64) {
        let s = store.get(id).unwrap();
        (s.onset, s.offset)
    }

    #[test]
    fn test_onset_cannot_cross_offset() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        assert!(drag.begin(&store, id, Boundary::Onset));
        drag.update(&mut store, 50.0, 100.0);
        let (onset, offset) = bounds(&store, id);
        assert!((onset - 11.999).abs() < 1e-9);
        assert_eq!(offset, 12.0);
        assert!(onset <= offset - 0.001 + 1e-12);
    }

    #[test]
    fn test_offset_clamped_to_duration() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Offset);
        drag.update(&mut store, 150.0, 100.0);
        assert_eq!(bounds(&store, id), (10.0, 100.0));
        drag.update(&mut store, -5.0, 100.0);
        assert!((bounds(&store, id).1 - 10.001).abs() < 1e-9);
    }

    #[test]
    fn test_unchanged_drag_is_noop() {
        let store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Onset);
        assert!(drag.finish(&store).is_none());
        assert_eq!(drag.phase(id), DragPhase::Idle);
    }

    #[test]
    fn test_commit_success_adopts_server_bounds() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Onset);
        drag.update(&mut store, 9.5, 100.0);
        let req = drag.finish(&store).unwrap();
        assert_eq!(req.server_id, 1);
        assert_eq!(req.body, BoundsBody { onset: 9.5, offset: 12.0 });
        assert_eq!(drag.phase(id), DragPhase::Committing);

        let snapped = Segment { id, onset: 9.52, offset: 12.0, name: None, notes: None };
        let out = drag.resolve::<String>(&mut store, id, Ok(snapped));
        assert_eq!(out, CommitOutcome::Committed { id, onset: 9.52, offset: 12.0 });
        assert_eq!(bounds(&store, id), (9.52, 12.0));
        assert_eq!(drag.phase(id), DragPhase::Idle);
    }

    #[test]
    fn test_commit_failure_restores_original_exactly() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Offset);
        drag.update(&mut store, 15.0, 100.0);
        drag.finish(&store).unwrap();

        let out = drag.resolve(&mut store, id, Err("HTTP 500"));
        assert!(matches!(out, CommitOutcome::Reverted { .. }));
        assert_eq!(bounds(&store, id), (10.0, 12.0));
    }

    #[test]
    fn test_no_new_drag_while_committing() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Onset);
        drag.update(&mut store, 9.0, 100.0);
        drag.finish(&store);
        assert!(!drag.begin(&store, id, Boundary::Onset));
        let confirmed = store.get(id).unwrap().clone();
        drag.resolve::<String>(&mut store, id, Ok(confirmed));
        assert!(drag.begin(&store, id, Boundary::Onset));
    }

    #[test]
    fn test_cancel_restores() {
        let mut store = store_with(1, 10.0, 12.0);
        let id = SegmentId::Server(1);
        let mut drag = SegmentDragHandler::new(0.001);
        drag.begin(&store, id, Boundary::Onset);
        drag.update(&mut store, 5.0, 100.0);
        assert!(drag.cancel(&mut store));
        assert_eq!(bounds(&store, id), (10.0, 12.0));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_stale_resolve() {
        let mut store = store_with(1, 10.0, 12.0);
        let mut drag = SegmentDragHandler::new(0.001);
        assert_eq!(drag.resolve(&mut store, SegmentId::Server(1), Err("x")), CommitOutcome::Stale);
        assert_eq!(bounds(&store, SegmentId::Server(1)), (10.0, 12.0));
    }
}
