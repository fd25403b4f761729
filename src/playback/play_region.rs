//! Play a time range and stop at its end.
//!
//! At most one stop point is active; starting a new region replaces it.

use crate::config::PlayerConfig;
use crate::playback::{seek::seek, Transport};
use crate::types::TimeRange;
use crate::viewport::ViewportModel;

#[derive(Clone, Debug)]
pub struct PlayRegionController {
    padding: f64,
    max_zoom: f64,
    autozoom_fraction: f64,
    active: Option<TimeRange>,
}

impl PlayRegionController {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            padding: config.region_padding,
            max_zoom: config.region_max_zoom,
            autozoom_fraction: config.region_autozoom_fraction,
            active: None,
        }
    }

    pub fn active(&self) -> Option<TimeRange> {
        self.active
    }

    /// Seek to `start`, play, and arm the stop at `end`. Short regions in an
    /// unzoomed view also zoom to fit. Returns false for an empty range.
    pub fn play_region<T: Transport + ?Sized>(
        &mut self,
        start: f64,
        end: f64,
        viewport: &mut ViewportModel,
        transport: &mut T,
    ) -> bool {
        if !(end > start) {
            log::debug!("Ignoring empty play region {start}-{end}");
            return false;
        }
        self.active = None;
        let start = seek(viewport, transport, start);
        let end = end.min(viewport.duration());
        self.active = Some(TimeRange::new(start, end));
        transport.play();

        let duration = viewport.duration();
        let len = end - start;
        if !viewport.is_zoomed() && len > 0.0 && len < duration * self.autozoom_fraction {
            let zoom = (duration / (len * (1.0 + 2.0 * self.padding))).min(self.max_zoom);
            viewport.set_zoom(zoom);
            viewport.center_on(start + len / 2.0);
            log::debug!("Region auto-zoom to {zoom:.2}x");
        }
        true
    }

    /// Feed playback time. Pauses once `t` reaches the region end. Returns
    /// true when it paused.
    pub fn on_time_update<T: Transport + ?Sized>(&mut self, t: f64, transport: &mut T) -> bool {
        match self.active {
            Some(r) if t >= r.end => {
                self.active = None;
                transport.pause();
                true
            }
            _ => false,
        }
    }

    /// Drop the stop if `t` lies outside the active region.
    pub fn on_user_seek(&mut self, t: f64) {
        if let Some(r) = self.active {
            if t < r.start || t > r.end {
                self.active = None;
            }
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
