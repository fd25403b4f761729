//! Create and delete as two-phase operations on the segment store.
//!
//! Phase one mutates the store immediately and hands back a request for the
//! network layer; phase two (`resolve_*`) applies the server's answer.

use serde::Serialize;
use crate::error::SelectionError;
use crate::segments::store::SegmentStore;
use crate::types::{Notice, Segment, SegmentId, Selection};

/// JSON body of a create call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateBody {
    pub onset: f64,
    pub offset: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// JSON body of a boundary update.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundsBody {
    pub onset: f64,
    pub offset: f64,
}

/// A create in flight, tied to its local placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct CreateRequest {
    pub placeholder: SegmentId,
    pub body: CreateBody,
}

/// A delete in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeleteRequest {
    pub id: SegmentId,
    pub server_id: i64,
}

/// Validate the selection and insert a placeholder for it.
pub fn commit_selection(
    store: &mut SegmentStore,
    selection: &Selection,
    min_len: f64,
    name: Option<String>,
) -> Result<CreateRequest, SelectionError> {
    let (onset, offset) = selection.bounds().ok_or(SelectionError::Incomplete)?;
    if offset - onset < min_len {
        return Err(SelectionError::Empty);
    }
    if store.overlaps(onset, offset, None) {
        return Err(SelectionError::Overlap);
    }
    let placeholder = store.insert_placeholder(onset, offset, name.clone(), None);
    log::info!("Creating segment {onset:.3}-{offset:.3}s");
    Ok(CreateRequest {
        placeholder,
        body: CreateBody { onset, offset, name, notes: None },
    })
}

/// Apply the outcome of a create. On failure the placeholder is dropped and a
/// notice returned.
pub fn resolve_create<E: std::fmt::Display>(
    store: &mut SegmentStore,
    request: &CreateRequest,
    result: Result<Segment, E>,
) -> Result<SegmentId, Notice> {
    match result {
        Ok(segment) => {
            let id = segment.id;
            log::info!("Segment {id:?} created ({:.3}-{:.3}s)", segment.onset, segment.offset);
            store.confirm_placeholder(request.placeholder, segment);
            Ok(id)
        }
        Err(e) => {
            log::error!("Segment create failed: {e}");
            store.remove(request.placeholder);
            Err(Notice::error(format!("Could not create segment: {e}")))
        }
    }
}

/// Mark a server segment for deletion. Placeholders and segments already
/// being deleted are refused.
pub fn request_delete(store: &mut SegmentStore, id: SegmentId) -> Option<DeleteRequest> {
    let server_id = id.server_id()?;
    if !store.contains(id) || store.is_deleting(id) {
        return None;
    }
    store.mark_deleting(id);
    log::info!("Deleting segment {server_id}");
    Some(DeleteRequest { id, server_id })
}

/// Remove on success; on failure the segment stays and a notice is returned.
pub fn resolve_delete<E: std::fmt::Display>(
    store: &mut SegmentStore,
    request: DeleteRequest,
    result: Result<(), E>,
) -> Option<Notice> {
    match result {
        Ok(()) => {
            store.confirm_delete(request.id);
            None
        }
        Err(e) => {
            log::error!("Segment {} delete failed: {e}", request.server_id);
            store.unmark_deleting(request.id);
            Some(Notice::error(format!("Could not delete segment: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: i64, onset: f64, offset: f64) -> Segment {
        Segment { id: SegmentId::Server(id), onset, offset, name: None, notes: None }
    }

    #[test]
    fn test_commit_rejects_invalid_selections() {
        let mut store = SegmentStore::new();
        store.merge(vec![seg(1, 10.0, 20.0)]);

        let partial = Selection { start: Some(1.0), end: None };
        assert_eq!(commit_selection(&mut store, &partial, 0.001, None), Err(SelectionError::Incomplete));

        let empty = Selection { start: Some(3.0), end: Some(3.0) };
        assert_eq!(commit_selection(&mut store, &empty, 0.001, None), Err(SelectionError::Empty));

        let overlap = Selection { start: Some(15.0), end: Some(25.0) };
        assert_eq!(commit_selection(&mut store, &overlap, 0.001, None), Err(SelectionError::Overlap));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_commit_normalizes_reversed_selection() {
        let mut store = SegmentStore::new();
        let sel = Selection { start: Some(5.0), end: Some(2.0) };
        let req = commit_selection(&mut store, &sel, 0.001, None).unwrap();
        assert_eq!(req.body.onset, 2.0);
        assert_eq!(req.body.offset, 5.0);
        assert!(store.contains(req.placeholder));
    }

    #[test]
    fn test_create_success_replaces_placeholder() {
        let mut store = SegmentStore::new();
        let sel = Selection { start: Some(1.0), end: Some(2.0) };
        let req = commit_selection(&mut store, &sel, 0.001, Some("trill".into())).unwrap();
        let id = resolve_create::<String>(&mut store, &req, Ok(seg(42, 1.0, 2.0))).unwrap();
        assert_eq!(id, SegmentId::Server(42));
        assert!(!store.contains(req.placeholder));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_failure_rolls_back() {
        let mut store = SegmentStore::new();
        let sel = Selection { start: Some(1.0), end: Some(2.0) };
        let req = commit_selection(&mut store, &sel, 0.001, None).unwrap();
        let notice = resolve_create(&mut store, &req, Err("HTTP 500")).unwrap_err();
        assert!(notice.text.contains("HTTP 500"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_body_omits_missing_fields() {
        let body = CreateBody { onset: 1.0, offset: 2.0, name: None, notes: None };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"onset":1.0,"offset":2.0}"#);
    }

    #[test]
    fn test_delete_lifecycle() {
        let mut store = SegmentStore::new();
        store.merge(vec![seg(1, 1.0, 2.0)]);
        let id = SegmentId::Server(1);

        let req = request_delete(&mut store, id).unwrap();
        assert!(store.is_deleting(id));
        assert!(request_delete(&mut store, id).is_none(), "already deleting");

        let notice = resolve_delete(&mut store, req, Err("offline"));
        assert!(notice.is_some());
        assert!(store.contains(id));
        assert!(!store.is_deleting(id));

        let req = request_delete(&mut store, id).unwrap();
        assert!(resolve_delete::<String>(&mut store, req, Ok(())).is_none());
        assert!(!store.contains(id));
        assert_eq!(store.merge(vec![seg(1, 1.0, 2.0)]), 0);
    }

    #[test]
    fn test_placeholders_cannot_be_deleted() {
        let mut store = SegmentStore::new();
        let local = store.insert_placeholder(1.0, 2.0, None, None);
        assert!(request_delete(&mut store, local).is_none());
    }
}
