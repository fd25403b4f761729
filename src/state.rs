//! Per-player session: every model one player instance owns, plus the
//! transitions driven by input, timers and network completions.
//!
//! Methods mutate synchronously and return the follow-up work (`Command`s)
//! for the component layer to carry out: timers, network calls, spectrogram
//! loading. Nothing here awaits.

use std::collections::VecDeque;
use crate::canvas::overlay_renderer::OverlayScene;
use crate::canvas::segment_renderer::{BoxStyle, SegmentHit, SegmentHoverEffects, SegmentLayout};
use crate::codec::payload::SpectrogramPayload;
use crate::config::{Endpoints, PlayerConfig};
use crate::error::ApiError;
use crate::interaction::gesture::{CanvasInteractionController, GestureEvent, GestureOutcome};
use crate::interaction::segment_drag::{CommitOutcome, SegmentDragHandler, UpdateRequest};
use crate::interaction::selection::SelectionModel;
use crate::playback::play_region::PlayRegionController;
use crate::playback::{seek, Transport};
use crate::segments::edit::{self, CreateRequest, DeleteRequest};
use crate::segments::loader::{FireAction, LoaderAction, ViewportSegmentLoader};
use crate::segments::store::SegmentStore;
use crate::types::{Notice, Segment, SegmentId, TimeRange, ViewMode, WaveformData};
use crate::view_manager::ViewManager;
use crate::viewport::ViewportModel;

const MAX_NOTICES: usize = 8;
/// Fraction of the visible duration moved by one nudge.
const NUDGE_FRACTION: f64 = 0.05;

/// Work the component layer must perform after a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// (Re)start the debounce timer; call `fire_segment_fetch(ticket)` when it elapses.
    ScheduleSegmentFetch { ticket: u64, delay_ms: u32 },
    /// Cancel the debounce timer, if any.
    CancelSegmentFetch,
    FetchSegments(TimeRange),
    LoadSpectrogram,
    Create(CreateRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
}

/// User-level actions shared by the toolbar and keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerAction {
    TogglePlay,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    MarkStart,
    MarkEnd,
    CommitSelection,
    ClearSelection,
    PlaySelection,
    ToggleView,
    DeleteSelected,
    /// Move the playhead by a fraction of the visible duration; sign gives direction.
    Nudge(f64),
}

/// Inputs that require a base-view redraw when they change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseKey {
    pub mode: ViewMode,
    pub zoom_level: f64,
    pub zoom_offset: f64,
    pub duration: f64,
    pub generation: u64,
}

pub struct PlayerSession {
    config: PlayerConfig,
    endpoints: Endpoints,
    pub viewport: ViewportModel,
    pub selection: SelectionModel,
    selected: Option<SegmentId>,
    pub store: SegmentStore,
    gesture: CanvasInteractionController,
    drag: SegmentDragHandler,
    hover: SegmentHoverEffects,
    region: PlayRegionController,
    loader: ViewportSegmentLoader,
    pub view: ViewManager,
    notices: VecDeque<Notice>,
    playing: bool,
}

impl PlayerSession {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            endpoints: config.endpoints(),
            viewport: ViewportModel::new(0.0),
            selection: SelectionModel::default(),
            selected: None,
            store: SegmentStore::new(),
            gesture: CanvasInteractionController::new(&config),
            drag: SegmentDragHandler::new(config.min_segment_separation),
            hover: SegmentHoverEffects::default(),
            region: PlayRegionController::new(&config),
            loader: ViewportSegmentLoader::new(&config),
            view: ViewManager::new(config.initial_view),
            notices: VecDeque::new(),
            playing: false,
            config,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn selected(&self) -> Option<SegmentId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<SegmentId> {
        self.hover.hovered()
    }

    pub fn drag(&self) -> &SegmentDragHandler {
        &self.drag
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn base_key(&self) -> BaseKey {
        BaseKey {
            mode: self.view.mode(),
            zoom_level: self.viewport.zoom_level(),
            zoom_offset: self.viewport.zoom_offset(),
            duration: self.viewport.duration(),
            generation: self.view.generation(),
        }
    }

    // ── Notices ──────────────────────────────────────────────────────────

    pub fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_back();
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Begin loading the recording. The spectrogram is requested too when it
    /// is the initial view.
    pub fn start_load(&mut self) -> Vec<Command> {
        self.view.start_waveform_load();
        self.spectrogram_if_needed()
    }

    pub fn on_waveform_loaded(&mut self, result: Result<WaveformData, ApiError>) -> Vec<Command> {
        let Some(duration) = self.view.finish_waveform(result) else {
            self.push_notice(Notice::error("Waveform could not be loaded"));
            return Vec::new();
        };
        self.viewport.set_duration(duration);
        if duration <= 0.0 {
            return Vec::new();
        }
        // Full-range fetch once; zoomed views fetch their own windows later
        vec![Command::FetchSegments(TimeRange::new(0.0, duration))]
    }

    pub fn on_spectrogram_progress(&mut self, progress: Option<f32>) {
        self.view.set_spectrogram_progress(progress);
    }

    pub fn on_spectrogram_loaded(&mut self, result: Result<SpectrogramPayload, ApiError>) {
        if let Err(e) = &result {
            self.push_notice(Notice::error(format!("Spectrogram could not be loaded: {e}")));
        }
        self.view.finish_spectrogram(result);
    }

    fn spectrogram_if_needed(&mut self) -> Vec<Command> {
        if self.view.needs_spectrogram() {
            self.view.start_spectrogram_load();
            vec![Command::LoadSpectrogram]
        } else {
            Vec::new()
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Vec<Command> {
        self.view.set_mode(mode);
        self.spectrogram_if_needed()
    }

    // ── Viewport and segment loading ─────────────────────────────────────

    /// Follow-up for any zoom/offset change.
    fn viewport_changed(&mut self) -> Vec<Command> {
        self.hover.leave();
        match self.loader.on_viewport_change(&self.viewport) {
            LoaderAction::Schedule { ticket, delay_ms, .. } => {
                vec![Command::ScheduleSegmentFetch { ticket, delay_ms }]
            }
            LoaderAction::Inactive | LoaderAction::Skip => vec![Command::CancelSegmentFetch],
        }
    }

    pub fn fire_segment_fetch(&mut self, ticket: u64) -> Vec<Command> {
        match self.loader.fire(ticket) {
            FireAction::Superseded => Vec::new(),
            FireAction::Cached(segments) => {
                self.store.merge(segments);
                Vec::new()
            }
            FireAction::Fetch(range) => vec![Command::FetchSegments(range)],
        }
    }

    pub fn on_segments_loaded(&mut self, range: TimeRange, result: Result<Vec<Segment>, ApiError>) {
        if let Some(segments) = self.loader.complete(range, result) {
            let added = self.store.merge(segments);
            log::debug!("Merged {added} new segments ({} cached)", self.store.len());
        }
    }

    pub fn zoom_in(&mut self) -> Vec<Command> {
        self.viewport.zoom_in();
        self.viewport_changed()
    }

    pub fn zoom_out(&mut self) -> Vec<Command> {
        self.viewport.zoom_out();
        self.viewport_changed()
    }

    pub fn reset_zoom(&mut self) -> Vec<Command> {
        self.viewport.reset_zoom();
        self.viewport_changed()
    }

    /// Ctrl+wheel zooms; plain wheel pans when zoomed in.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, zoom_modifier: bool, width: f64) -> Vec<Command> {
        if zoom_modifier {
            if delta_y < 0.0 {
                return self.zoom_in();
            } else if delta_y > 0.0 {
                return self.zoom_out();
            }
            return Vec::new();
        }
        if !self.viewport.is_zoomed() {
            return Vec::new();
        }
        let delta_px = if delta_x.abs() > delta_y.abs() { delta_x } else { delta_y };
        self.viewport.pan_by_time(delta_px * self.viewport.seconds_per_pixel(width));
        self.viewport_changed()
    }

    // ── Playback ─────────────────────────────────────────────────────────

    /// User-initiated seek. Disarms a region stop outside the new position.
    pub fn seek(&mut self, t: f64, transport: &mut dyn Transport) -> Vec<Command> {
        let was_zoomed = self.viewport.is_zoomed();
        let t = seek::seek(&mut self.viewport, transport, t);
        self.region.on_user_seek(t);
        if was_zoomed {
            self.viewport_changed()
        } else {
            Vec::new()
        }
    }

    pub fn play_region(&mut self, start: f64, end: f64, transport: &mut dyn Transport) -> Vec<Command> {
        let zoom_before = (self.viewport.zoom_level(), self.viewport.zoom_offset());
        if !self.region.play_region(start, end, &mut self.viewport, transport) {
            return Vec::new();
        }
        self.playing = true;
        if zoom_before != (self.viewport.zoom_level(), self.viewport.zoom_offset()) {
            self.viewport_changed()
        } else {
            Vec::new()
        }
    }

    pub fn toggle_play(&mut self, transport: &mut dyn Transport) {
        if transport.is_playing() {
            transport.pause();
        } else {
            transport.play();
        }
        self.playing = transport.is_playing();
    }

    /// Media time update.
    pub fn on_time_update(&mut self, t: f64, transport: &mut dyn Transport) {
        self.viewport.set_current_time(t);
        if self.region.on_time_update(t, transport) {
            self.playing = false;
        }
    }

    /// Media play/pause/ended events.
    pub fn on_play_state(&mut self, playing: bool) {
        self.playing = playing;
        if !playing {
            self.region.cancel();
        }
    }

    // ── Main canvas ──────────────────────────────────────────────────────

    pub fn main_pointer(&mut self, event: GestureEvent, width: f64, transport: &mut dyn Transport) -> Vec<Command> {
        match self.gesture.dispatch(event, &mut self.viewport, width) {
            GestureOutcome::None | GestureOutcome::PanFinished => Vec::new(),
            GestureOutcome::Panned => self.viewport_changed(),
            GestureOutcome::Seek(t) => self.seek(t, transport),
        }
    }

    pub fn overlay_scene(&self, width: f64) -> OverlayScene {
        let hover_bounds = self
            .hover
            .hovered()
            .and_then(|id| self.store.get(id))
            .map(|s| (s.onset, s.offset));
        OverlayScene::build(&self.viewport, &self.selection.get(), hover_bounds, width)
    }

    // ── Timeline ─────────────────────────────────────────────────────────

    pub fn segment_layout(&self, width: f64) -> SegmentLayout {
        let hovered = self.hover.hovered();
        SegmentLayout::build(self.store.iter(), &self.viewport, width, |s| {
            if s.id.is_local() || self.store.is_deleting(s.id) {
                BoxStyle::Pending
            } else if Some(s.id) == self.selected {
                BoxStyle::Selected
            } else if Some(s.id) == hovered {
                BoxStyle::Hovered
            } else {
                BoxStyle::Normal
            }
        })
    }

    fn timeline_hit(&self, x: f64, width: f64) -> Option<SegmentHit> {
        self.segment_layout(width).hit_test(x, self.config.handle_hit_px)
    }

    /// Returns true if a boundary drag started (the caller should capture
    /// the pointer).
    pub fn timeline_pointer_down(&mut self, x: f64, width: f64) -> bool {
        match self.timeline_hit(x, width) {
            Some(SegmentHit::Handle { id, boundary }) => {
                self.selected = Some(id);
                self.drag.begin(&self.store, id, boundary)
            }
            Some(SegmentHit::Body { id }) => {
                self.selected = Some(id);
                false
            }
            None => {
                self.selected = None;
                false
            }
        }
    }

    pub fn timeline_pointer_move(&mut self, x: f64, width: f64) {
        if self.drag.is_dragging() {
            let t = self.viewport.pixel_to_time(x, width);
            self.drag.update(&mut self.store, t, self.viewport.duration());
            return;
        }
        match self.timeline_hit(x, width) {
            Some(SegmentHit::Handle { id, .. }) | Some(SegmentHit::Body { id }) => {
                self.hover.enter(id);
            }
            None => {
                self.hover.leave();
            }
        }
    }

    pub fn timeline_pointer_up(&mut self) -> Vec<Command> {
        match self.drag.finish(&self.store) {
            Some(req) => vec![Command::Update(req)],
            None => Vec::new(),
        }
    }

    pub fn timeline_pointer_leave(&mut self) -> Vec<Command> {
        self.hover.leave();
        self.timeline_pointer_up()
    }

    pub fn timeline_double_click(&mut self, x: f64, width: f64, transport: &mut dyn Transport) -> Vec<Command> {
        let Some(SegmentHit::Body { id } | SegmentHit::Handle { id, .. }) = self.timeline_hit(x, width) else {
            return Vec::new();
        };
        self.play_segment(id, transport)
    }

    pub fn play_segment(&mut self, id: SegmentId, transport: &mut dyn Transport) -> Vec<Command> {
        let Some((onset, offset)) = self.store.get(id).map(|s| (s.onset, s.offset)) else {
            return Vec::new();
        };
        self.play_region(onset, offset, transport)
    }

    // ── Segment persistence results ──────────────────────────────────────

    pub fn on_update_result(&mut self, id: SegmentId, result: Result<Segment, ApiError>) {
        match self.drag.resolve(&mut self.store, id, result) {
            CommitOutcome::Committed { .. } | CommitOutcome::Stale => {}
            CommitOutcome::Reverted { notice, .. } => {
                self.hover.leave();
                self.push_notice(notice);
            }
        }
    }

    pub fn on_create_result(&mut self, request: &CreateRequest, result: Result<Segment, ApiError>) {
        match edit::resolve_create(&mut self.store, request, result) {
            Ok(id) => {
                if self.selected == Some(request.placeholder) || self.selected.is_none() {
                    self.selected = Some(id);
                }
            }
            Err(notice) => {
                if self.selected == Some(request.placeholder) {
                    self.selected = None;
                }
                self.push_notice(notice);
            }
        }
    }

    pub fn on_delete_result(&mut self, request: DeleteRequest, result: Result<(), ApiError>) {
        let ok = result.is_ok();
        if let Some(notice) = edit::resolve_delete(&mut self.store, request, result) {
            self.push_notice(notice);
        }
        if ok && self.selected == Some(request.id) {
            self.selected = None;
        }
        if ok && self.hover.hovered() == Some(request.id) {
            self.hover.leave();
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    pub fn perform(&mut self, action: PlayerAction, transport: &mut dyn Transport) -> Vec<Command> {
        let duration = self.viewport.duration();
        let now = self.viewport.current_time();
        match action {
            PlayerAction::TogglePlay => {
                self.toggle_play(transport);
                Vec::new()
            }
            PlayerAction::ZoomIn => self.zoom_in(),
            PlayerAction::ZoomOut => self.zoom_out(),
            PlayerAction::ResetZoom => self.reset_zoom(),
            PlayerAction::MarkStart => {
                self.selection.mark_start(now, duration);
                Vec::new()
            }
            PlayerAction::MarkEnd => {
                self.selection.mark_end(now, duration);
                Vec::new()
            }
            PlayerAction::ClearSelection => {
                self.selection.clear();
                Vec::new()
            }
            PlayerAction::CommitSelection => self.commit_selection(),
            PlayerAction::PlaySelection => match self.selection.get().bounds() {
                Some((start, end)) => self.play_region(start, end, transport),
                None => Vec::new(),
            },
            PlayerAction::ToggleView => self.set_view_mode(self.view.mode().toggled()),
            PlayerAction::DeleteSelected => self.delete_selected(),
            PlayerAction::Nudge(direction) => {
                let step = self.viewport.visible_duration() * NUDGE_FRACTION * direction.signum();
                self.seek(now + step, transport)
            }
        }
    }

    pub fn commit_selection(&mut self) -> Vec<Command> {
        let sel = self.selection.get();
        match edit::commit_selection(&mut self.store, &sel, self.config.min_segment_separation, None) {
            Ok(req) => {
                self.selection.clear();
                self.selected = Some(req.placeholder);
                vec![Command::Create(req)]
            }
            Err(e) => {
                log::debug!("Selection not committed: {e}");
                Vec::new()
            }
        }
    }

    pub fn delete_selected(&mut self) -> Vec<Command> {
        let Some(id) = self.selected else { return Vec::new() };
        if self.drag.is_committing(id) {
            log::debug!("Delete of {id:?} refused while a boundary update is pending");
            return Vec::new();
        }
        match edit::request_delete(&mut self.store, id) {
            Some(req) => vec![Command::Delete(req)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fake::FakeTransport;

    fn session(duration: f64) -> PlayerSession {
        let mut s = PlayerSession::new(PlayerConfig::default());
        s.start_load();
        let data = WaveformData { samples: vec![0.0; 1000], duration_secs: duration };
        s.on_waveform_loaded(Ok(data));
        s
    }

    fn seg(id: i64, onset: f64, offset: f64) -> Segment {
        Segment { id: SegmentId::Server(id), onset, offset, name: None, notes: None }
    }

    #[test]
    fn test_waveform_load_fetches_full_range() {
        let mut s = PlayerSession::new(PlayerConfig::default());
        assert!(s.start_load().is_empty());
        let cmds = s.on_waveform_loaded(Ok(WaveformData { samples: vec![], duration_secs: 60.0 }));
        assert_eq!(cmds, vec![Command::FetchSegments(TimeRange::new(0.0, 60.0))]);
        assert_eq!(s.viewport.duration(), 60.0);
    }

    #[test]
    fn test_initial_spectrogram_view_requests_payload() {
        let cfg = PlayerConfig { initial_view: ViewMode::Spectrogram, ..PlayerConfig::default() };
        let mut s = PlayerSession::new(cfg);
        assert_eq!(s.start_load(), vec![Command::LoadSpectrogram]);
        // Toggling back and forth does not refetch
        s.perform(PlayerAction::ToggleView, &mut FakeTransport::default());
        let cmds = s.perform(PlayerAction::ToggleView, &mut FakeTransport::default());
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_waveform_failure_pushes_notice() {
        let mut s = PlayerSession::new(PlayerConfig::default());
        s.start_load();
        assert!(s.on_waveform_loaded(Err(ApiError::Status(500))).is_empty());
        assert!(s.latest_notice().is_some());
    }

    #[test]
    fn test_zoom_schedules_debounced_fetch() {
        let mut s = session(100.0);
        let cmds = s.zoom_in();
        let Some(Command::ScheduleSegmentFetch { ticket, delay_ms }) = cmds.first().cloned() else {
            panic!("expected schedule, got {cmds:?}");
        };
        assert_eq!(delay_ms, 300);
        let cmds = s.fire_segment_fetch(ticket);
        assert!(matches!(cmds.as_slice(), [Command::FetchSegments(_)]));
        let cmds = s.reset_zoom();
        assert_eq!(cmds, vec![Command::CancelSegmentFetch]);
    }

    #[test]
    fn test_segments_merge_into_store() {
        let mut s = session(100.0);
        let range = TimeRange::new(0.0, 100.0);
        s.on_segments_loaded(range, Ok(vec![seg(1, 1.0, 2.0), seg(2, 3.0, 4.0)]));
        s.on_segments_loaded(range, Ok(vec![seg(2, 3.0, 4.0)]));
        assert_eq!(s.store.len(), 2);
    }

    #[test]
    fn test_click_seeks_and_recenters() {
        let mut s = session(100.0);
        let mut tr = FakeTransport::default();
        s.zoom_in();
        s.zoom_in(); // 4x, window [37.5, 62.5]
        s.main_pointer(GestureEvent::Down { x: 250.0, time_ms: 0.0 }, 500.0, &mut tr);
        s.main_pointer(GestureEvent::Up { x: 250.0, time_ms: 50.0 }, 500.0, &mut tr);
        assert!((tr.position - 50.0).abs() < 1e-9);
        assert!((s.viewport.zoom_offset() - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_selection_commit_and_failure_rollback() {
        let mut s = session(100.0);
        let mut tr = FakeTransport::default();
        s.seek(10.0, &mut tr);
        s.perform(PlayerAction::MarkStart, &mut tr);
        s.seek(12.0, &mut tr);
        s.perform(PlayerAction::MarkEnd, &mut tr);

        let cmds = s.perform(PlayerAction::CommitSelection, &mut tr);
        let [Command::Create(req)] = cmds.as_slice() else { panic!("expected create, got {cmds:?}") };
        assert_eq!((req.body.onset, req.body.offset), (10.0, 12.0));
        assert_eq!(s.store.len(), 1);
        assert!(s.selection.get().is_empty());

        s.on_create_result(req, Err(ApiError::Rejected("no".into())));
        assert!(s.store.is_empty());
        assert_eq!(s.selected(), None);
        assert_eq!(s.latest_notice().unwrap().text, "Could not create segment: no");
    }

    #[test]
    fn test_overlapping_selection_silently_rejected() {
        let mut s = session(100.0);
        s.on_segments_loaded(TimeRange::new(0.0, 100.0), Ok(vec![seg(1, 10.0, 20.0)]));
        s.selection.set(15.0, 25.0, 100.0);
        assert!(s.commit_selection().is_empty());
        assert_eq!(s.store.len(), 1);
        assert!(s.latest_notice().is_none());
    }

    #[test]
    fn test_boundary_drag_round_trip_on_timeline() {
        let mut s = session(100.0);
        s.on_segments_loaded(TimeRange::new(0.0, 100.0), Ok(vec![seg(1, 40.0, 50.0)]));
        // width 1000 => 10 px/s, onset handle at x=400
        assert!(s.timeline_pointer_down(401.0, 1000.0));
        s.timeline_pointer_move(380.0, 1000.0);
        let cmds = s.timeline_pointer_up();
        let [Command::Update(req)] = cmds.as_slice() else { panic!("expected update, got {cmds:?}") };
        assert!((req.body.onset - 38.0).abs() < 1e-9);

        s.on_update_result(req.id, Err(ApiError::Network("offline".into())));
        let restored = s.store.get(SegmentId::Server(1)).unwrap();
        assert_eq!((restored.onset, restored.offset), (40.0, 50.0));
        assert!(s.latest_notice().is_some());
    }

    #[test]
    fn test_delete_selected_segment() {
        let mut s = session(100.0);
        s.on_segments_loaded(TimeRange::new(0.0, 100.0), Ok(vec![seg(1, 40.0, 50.0)]));
        assert!(!s.timeline_pointer_down(450.0, 1000.0));
        assert_eq!(s.selected(), Some(SegmentId::Server(1)));

        let cmds = s.perform(PlayerAction::DeleteSelected, &mut FakeTransport::default());
        let [Command::Delete(req)] = cmds.as_slice() else { panic!("expected delete, got {cmds:?}") };
        // The pending segment offers no handles
        assert!(!s.segment_layout(1000.0).boxes[0].has_handles);

        s.on_delete_result(*req, Ok(()));
        assert!(s.store.is_empty());
        assert_eq!(s.selected(), None);
    }

    fn fetch_now(s: &mut PlayerSession, cmds: Vec<Command>) -> Vec<Command> {
        let Some(Command::ScheduleSegmentFetch { ticket, .. }) = cmds.first().cloned() else {
            panic!("expected schedule, got {cmds:?}");
        };
        s.fire_segment_fetch(ticket)
    }

    #[test]
    fn test_deleted_segment_stays_gone_on_cached_revisit() {
        let mut s = session(100.0);
        let cmds = s.zoom_in();
        let cmds = fetch_now(&mut s, cmds);
        let [Command::FetchSegments(home_range)] = cmds.as_slice() else {
            panic!("expected fetch, got {cmds:?}");
        };
        s.on_segments_loaded(*home_range, Ok(vec![seg(1, 40.0, 50.0)]));

        let x = s.viewport.time_to_pixel(45.0, 1000.0);
        s.timeline_pointer_down(x, 1000.0);
        let cmds = s.perform(PlayerAction::DeleteSelected, &mut FakeTransport::default());
        let [Command::Delete(req)] = cmds.as_slice() else { panic!("expected delete, got {cmds:?}") };
        s.on_delete_result(*req, Ok(()));
        assert!(s.store.is_empty());

        // Pan away and fetch a fresh window
        let home = s.viewport.zoom_offset();
        s.viewport.set_offset(if home > 0.25 { 0.0 } else { 0.5 });
        let cmds = s.viewport_changed();
        let cmds = fetch_now(&mut s, cmds);
        let [Command::FetchSegments(away_range)] = cmds.as_slice() else {
            panic!("expected fetch, got {cmds:?}");
        };
        s.on_segments_loaded(*away_range, Ok(vec![]));

        // Back home: served from the cache, which still lists segment 1
        s.viewport.set_offset(home);
        let cmds = s.viewport_changed();
        assert!(fetch_now(&mut s, cmds).is_empty());
        assert!(s.store.is_empty());
    }

    #[test]
    fn test_double_click_plays_segment_region() {
        let mut s = session(100.0);
        let mut tr = FakeTransport::default();
        s.on_segments_loaded(TimeRange::new(0.0, 100.0), Ok(vec![seg(1, 10.0, 20.0)]));
        s.timeline_double_click(150.0, 1000.0, &mut tr);
        assert!(tr.playing);
        assert_eq!(tr.position, 10.0);
        assert!(s.viewport.is_zoomed());
        s.on_time_update(20.0, &mut tr);
        assert!(!tr.playing);
        assert!(!s.is_playing());
    }

    #[test]
    fn test_hover_sets_guides_and_clears_on_zoom() {
        let mut s = session(100.0);
        s.on_segments_loaded(TimeRange::new(0.0, 100.0), Ok(vec![seg(1, 10.0, 20.0)]));
        s.timeline_pointer_move(150.0, 1000.0);
        assert_eq!(s.hovered(), Some(SegmentId::Server(1)));
        assert_eq!(s.overlay_scene(1000.0).guides, Some((100.0, 200.0)));
        s.zoom_in();
        assert_eq!(s.hovered(), None);
    }

    #[test]
    fn test_nudge_moves_by_visible_fraction() {
        let mut s = session(100.0);
        let mut tr = FakeTransport::default();
        s.seek(50.0, &mut tr);
        s.perform(PlayerAction::Nudge(1.0), &mut tr);
        assert!((tr.position - 55.0).abs() < 1e-9);
        s.perform(PlayerAction::Nudge(-1.0), &mut tr);
        s.perform(PlayerAction::Nudge(-1.0), &mut tr);
        assert!((tr.position - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_ctrl_wheel_zooms_plain_wheel_pans() {
        let mut s = session(100.0);
        s.wheel(0.0, -100.0, true, 500.0);
        assert_eq!(s.viewport.zoom_level(), 2.0);
        let before = s.viewport.visible_start();
        s.wheel(0.0, 50.0, false, 500.0); // 50 px at 10 px/s
        assert!((s.viewport.visible_start() - before - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_notices_are_capped() {
        let mut s = session(10.0);
        for i in 0..20 {
            s.push_notice(Notice::info(format!("n{i}")));
        }
        assert_eq!(s.latest_notice().unwrap().text, "n19");
        s.dismiss_notice();
        assert_eq!(s.latest_notice().unwrap().text, "n18");
    }
}
