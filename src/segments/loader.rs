//! On-demand segment fetching for the visible window of long recordings.
//!
//! The loader never touches timers or the network itself: it tells the caller
//! when to schedule a debounced fetch (`Schedule`), and whether a fired timer
//! is still current (`fire`). A newer viewport change supersedes any pending
//! ticket, so a stale timer that still fires is ignored.

use std::collections::HashMap;
use crate::config::PlayerConfig;
use crate::types::{Segment, TimeRange};
use crate::viewport::ViewportModel;

/// Segment lists keyed by the exact fetched range. Write-once per key.
#[derive(Clone, Debug, Default)]
pub struct ViewportCache {
    entries: HashMap<(u64, u64), Vec<Segment>>,
}

impl ViewportCache {
    fn key(range: TimeRange) -> (u64, u64) {
        (range.start.to_bits(), range.end.to_bits())
    }

    pub fn get(&self, range: TimeRange) -> Option<&Vec<Segment>> {
        self.entries.get(&Self::key(range))
    }

    /// Returns false if the key was already present (the entry is kept).
    pub fn insert(&mut self, range: TimeRange, segments: Vec<Segment>) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(Self::key(range)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(segments);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoaderAction {
    /// Not zoomed in; nothing to do.
    Inactive,
    /// Close enough to the last fetched range.
    Skip,
    /// Start (or restart) the debounce timer for `ticket`.
    Schedule { ticket: u64, delay_ms: u32, range: TimeRange },
}

#[derive(Clone, Debug, PartialEq)]
pub enum FireAction {
    Superseded,
    Cached(Vec<Segment>),
    Fetch(TimeRange),
}

#[derive(Clone, Debug)]
pub struct ViewportSegmentLoader {
    debounce_ms: u32,
    padding: f64,
    refetch_threshold: f64,
    cache: ViewportCache,
    last_loaded: Option<TimeRange>,
    pending: Option<(u64, TimeRange)>,
    next_ticket: u64,
}

impl ViewportSegmentLoader {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            debounce_ms: config.loader_debounce_ms,
            padding: config.loader_padding,
            refetch_threshold: config.loader_refetch_threshold,
            cache: ViewportCache::default(),
            last_loaded: None,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn cache(&self) -> &ViewportCache {
        &self.cache
    }

    pub fn last_loaded(&self) -> Option<TimeRange> {
        self.last_loaded
    }

    /// Visible window padded on both sides, clamped to the recording.
    pub fn padded_range(&self, viewport: &ViewportModel) -> TimeRange {
        let pad = viewport.visible_duration() * self.padding;
        TimeRange::new(
            (viewport.visible_start() - pad).max(0.0),
            (viewport.visible_end() + pad).min(viewport.duration()),
        )
    }

    pub fn on_viewport_change(&mut self, viewport: &ViewportModel) -> LoaderAction {
        if !viewport.is_zoomed() {
            self.pending = None;
            return LoaderAction::Inactive;
        }

        let range = self.padded_range(viewport);
        let tolerance = viewport.visible_duration() * self.refetch_threshold;
        if let Some(last) = self.last_loaded {
            if (range.start - last.start).abs() <= tolerance && (range.end - last.end).abs() <= tolerance {
                self.pending = None;
                log::debug!("Segment loader: {:.2}-{:.2}s close to last fetch, skipping", range.start, range.end);
                return LoaderAction::Skip;
            }
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some((ticket, range));
        LoaderAction::Schedule { ticket, delay_ms: self.debounce_ms, range }
    }

    /// Called when the debounce timer for `ticket` fires.
    pub fn fire(&mut self, ticket: u64) -> FireAction {
        match self.pending {
            Some((t, range)) if t == ticket => {
                self.pending = None;
                self.last_loaded = Some(range);
                if let Some(cached) = self.cache.get(range) {
                    log::debug!("Segment loader: cache hit for {:.2}-{:.2}s", range.start, range.end);
                    FireAction::Cached(cached.clone())
                } else {
                    log::debug!("Segment loader: fetching {:.2}-{:.2}s", range.start, range.end);
                    FireAction::Fetch(range)
                }
            }
            _ => FireAction::Superseded,
        }
    }

    /// Record a finished fetch. Returns the segments to merge on success.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        range: TimeRange,
        result: Result<Vec<Segment>, E>,
    ) -> Option<Vec<Segment>> {
        match result {
            Ok(segments) => {
                self.cache.insert(range, segments.clone());
                Some(segments)
            }
            Err(e) => {
                log::warn!("Segment fetch for {:.2}-{:.2}s failed: {e}", range.start, range.end);
                if self.last_loaded == Some(range) {
                    self.last_loaded = None;
                }
                None
            }
        }
    }
}
