//! Locally cached, optimistically mutable copy of the server's segments.
//!
//! Mutated only by viewport merges, boundary-drag commit/rollback and explicit
//! create/delete, always synchronously between suspension points.

use std::collections::HashSet;
use crate::types::{Segment, SegmentId};

#[derive(Clone, Debug, Default)]
pub struct SegmentStore {
    /// Kept sorted by onset.
    segments: Vec<Segment>,
    /// Segments with a delete call in flight.
    deleting: HashSet<SegmentId>,
    /// Segments the server confirmed as deleted. Never merged back in.
    deleted: HashSet<SegmentId>,
    next_local: u32,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `[start, end)` overlaps any segment other than `except`.
    pub fn overlaps(&self, start: f64, end: f64, except: Option<SegmentId>) -> bool {
        self.segments
            .iter()
            .any(|s| Some(s.id) != except && s.overlaps(start, end))
    }

    /// Add segments whose id is neither cached nor deleted. Returns the
    /// number added.
    pub fn merge(&mut self, incoming: Vec<Segment>) -> usize {
        let mut added = 0;
        for seg in incoming {
            if self.deleted.contains(&seg.id) || self.contains(seg.id) {
                continue;
            }
            self.segments.push(seg);
            added += 1;
        }
        if added > 0 {
            self.sort();
        }
        added
    }

    /// Insert a local placeholder for a segment being created.
    pub fn insert_placeholder(
        &mut self,
        onset: f64,
        offset: f64,
        name: Option<String>,
        notes: Option<String>,
    ) -> SegmentId {
        self.next_local = self.next_local.wrapping_add(1);
        let id = SegmentId::Local(self.next_local);
        self.segments.push(Segment { id, onset, offset, name, notes });
        self.sort();
        id
    }

    /// Replace a placeholder with the server's segment.
    ///
    /// If a viewport merge already brought in the server segment, the
    /// placeholder is simply dropped.
    pub fn confirm_placeholder(&mut self, local: SegmentId, confirmed: Segment) {
        self.segments.retain(|s| s.id != local);
        if !self.contains(confirmed.id) {
            self.segments.push(confirmed);
            self.sort();
        }
    }

    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        self.deleting.remove(&id);
        let idx = self.segments.iter().position(|s| s.id == id)?;
        Some(self.segments.remove(idx))
    }

    /// Drop a segment the server has deleted and keep it out of later merges.
    pub fn confirm_delete(&mut self, id: SegmentId) -> Option<Segment> {
        self.deleted.insert(id);
        self.remove(id)
    }

    /// Set onset/offset in place.
    pub fn set_bounds(&mut self, id: SegmentId, onset: f64, offset: f64) -> bool {
        let Some(seg) = self.get_mut(id) else { return false };
        seg.onset = onset;
        seg.offset = offset;
        self.sort();
        true
    }

    pub fn mark_deleting(&mut self, id: SegmentId) {
        self.deleting.insert(id);
    }

    pub fn unmark_deleting(&mut self, id: SegmentId) {
        self.deleting.remove(&id);
    }

    pub fn is_deleting(&self, id: SegmentId) -> bool {
        self.deleting.contains(&id)
    }

    fn sort(&mut self) {
        self.segments.sort_by(|a, b| a.onset.total_cmp(&b.onset));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: i64, onset: f64, offset: f64) -> Segment {
        Segment { id: SegmentId::Server(id), onset, offset, name: None, notes: None }
    }

    #[test]
    fn test_merge_skips_known_ids() {
        let mut store = SegmentStore::new();
        assert_eq!(store.merge(vec![seg(1, 5.0, 6.0), seg(2, 1.0, 2.0)]), 2);
        // Same id with different bounds must not replace the local copy
        assert_eq!(store.merge(vec![seg(1, 50.0, 60.0), seg(3, 3.0, 4.0)]), 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(SegmentId::Server(1)).unwrap().onset, 5.0);
        let onsets: Vec<f64> = store.iter().map(|s| s.onset).collect();
        assert_eq!(onsets, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_placeholder_lifecycle() {
        let mut store = SegmentStore::new();
        let local = store.insert_placeholder(1.0, 2.0, Some("call".into()), None);
        assert!(local.is_local());
        assert!(store.contains(local));
        store.confirm_placeholder(local, seg(99, 1.0, 2.0));
        assert!(!store.contains(local));
        assert!(store.contains(SegmentId::Server(99)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_confirm_after_merge_does_not_duplicate() {
        let mut store = SegmentStore::new();
        let local = store.insert_placeholder(1.0, 2.0, None, None);
        store.merge(vec![seg(7, 1.0, 2.0)]);
        store.confirm_placeholder(local, seg(7, 1.0, 2.0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overlap_excluding_self() {
        let mut store = SegmentStore::new();
        store.merge(vec![seg(1, 1.0, 2.0), seg(2, 3.0, 4.0)]);
        assert!(store.overlaps(1.5, 3.5, None));
        assert!(!store.overlaps(2.0, 3.0, None));
        assert!(!store.overlaps(0.5, 2.5, Some(SegmentId::Server(1))));
    }

    #[test]
    fn test_remove_clears_deleting_flag() {
        let mut store = SegmentStore::new();
        store.merge(vec![seg(1, 1.0, 2.0)]);
        store.mark_deleting(SegmentId::Server(1));
        assert!(store.is_deleting(SegmentId::Server(1)));
        assert!(store.remove(SegmentId::Server(1)).is_some());
        assert!(!store.is_deleting(SegmentId::Server(1)));
        assert!(store.remove(SegmentId::Server(1)).is_none());
    }

    #[test]
    fn test_deleted_segment_is_not_merged_back() {
        let mut store = SegmentStore::new();
        store.merge(vec![seg(1, 1.0, 2.0), seg(2, 3.0, 4.0)]);
        store.mark_deleting(SegmentId::Server(1));
        assert!(store.confirm_delete(SegmentId::Server(1)).is_some());
        assert!(!store.is_deleting(SegmentId::Server(1)));

        // A stale list that still has segment 1 only adds the new one
        assert_eq!(store.merge(vec![seg(1, 1.0, 2.0), seg(3, 5.0, 6.0)]), 1);
        assert!(!store.contains(SegmentId::Server(1)));
        assert_eq!(store.len(), 2);
    }
}
