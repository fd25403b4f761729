//! Zoom/pan state and the time <-> pixel transform shared by every view.
//!
//! Invariant: `zoom_level` is in `[MIN_ZOOM, MAX_ZOOM]` and `zoom_offset` is in
//! `[0, 1 - 1/zoom_level]`, so the visible window is always a contiguous
//! in-bounds subinterval of `[0, duration]`. Every mutator re-establishes it.

use crate::types::TimeRange;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewportModel {
    duration: f64,
    zoom_level: f64,
    zoom_offset: f64,
    current_time: f64,
}

impl ViewportModel {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: sanitize_duration(duration),
            zoom_level: MIN_ZOOM,
            zoom_offset: 0.0,
            current_time: 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Replace the duration (e.g. once the waveform arrives), keeping zoom.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = sanitize_duration(duration);
        self.current_time = self.current_time.clamp(0.0, self.duration);
        self.zoom_offset = self.zoom_offset.clamp(0.0, self.max_offset());
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn zoom_offset(&self) -> f64 {
        self.zoom_offset
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom_level > MIN_ZOOM
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn set_current_time(&mut self, t: f64) {
        self.current_time = clamp_time(t, self.duration);
    }

    pub fn visible_duration(&self) -> f64 {
        self.duration / self.zoom_level
    }

    pub fn visible_start(&self) -> f64 {
        self.zoom_offset * self.duration
    }

    pub fn visible_end(&self) -> f64 {
        (self.visible_start() + self.visible_duration()).min(self.duration)
    }

    pub fn visible_range(&self) -> TimeRange {
        TimeRange::new(self.visible_start(), self.visible_end())
    }

    pub fn is_visible(&self, t: f64) -> bool {
        t >= self.visible_start() && t <= self.visible_end()
    }

    /// Largest valid offset for the current zoom.
    pub fn max_offset(&self) -> f64 {
        (1.0 - 1.0 / self.zoom_level).max(0.0)
    }

    pub fn pixel_to_time(&self, x: f64, width: f64) -> f64 {
        if width <= 0.0 {
            return self.visible_start();
        }
        self.visible_start() + (x / width) * self.visible_duration()
    }

    pub fn time_to_pixel(&self, t: f64, width: f64) -> f64 {
        let vd = self.visible_duration();
        if vd <= 0.0 {
            return 0.0;
        }
        ((t - self.visible_start()) / vd) * width
    }

    /// Set the offset, clamped to the valid range.
    pub fn set_offset(&mut self, offset: f64) {
        let o = if offset.is_finite() { offset } else { 0.0 };
        self.zoom_offset = o.clamp(0.0, self.max_offset());
    }

    /// Change zoom while keeping the time at the viewport centre fixed.
    pub fn set_zoom(&mut self, level: f64) {
        if !level.is_finite() {
            return;
        }
        let center = self.visible_start() + self.visible_duration() / 2.0;
        self.zoom_level = level.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.duration <= 0.0 {
            self.zoom_offset = 0.0;
            return;
        }
        let half = self.visible_duration() / 2.0;
        self.set_offset((center - half) / self.duration);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom_level * 2.0);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom_level / 2.0);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom_level = MIN_ZOOM;
        self.zoom_offset = 0.0;
    }

    /// Centre the visible window on `t` (clamped at the recording edges).
    pub fn center_on(&mut self, t: f64) {
        if self.duration <= 0.0 {
            return;
        }
        let ratio = t / self.duration;
        self.set_offset(ratio - self.visible_duration() / (2.0 * self.duration));
    }

    /// Pan by a time delta in seconds.
    pub fn pan_by_time(&mut self, dt: f64) {
        if self.duration <= 0.0 {
            return;
        }
        self.set_offset(self.zoom_offset + dt / self.duration);
    }

    /// Seconds represented by one pixel at `width`.
    pub fn seconds_per_pixel(&self, width: f64) -> f64 {
        if width <= 0.0 {
            return 0.0;
        }
        self.visible_duration() / width
    }
}

fn sanitize_duration(d: f64) -> f64 {
    if d.is_finite() && d > 0.0 { d } else { 0.0 }
}

/// Clamp a time to `[0, duration]`, mapping NaN to 0.
pub fn clamp_time(t: f64, duration: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, duration.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(vp: &ViewportModel) {
        assert!(vp.zoom_level() >= MIN_ZOOM && vp.zoom_level() <= MAX_ZOOM);
        let max = 1.0 - 1.0 / vp.zoom_level();
        assert!(vp.zoom_offset() >= 0.0, "offset {} < 0", vp.zoom_offset());
        assert!(vp.zoom_offset() <= max + 1e-12, "offset {} > {max}", vp.zoom_offset());
        assert!(vp.visible_end() <= vp.duration() + 1e-9);
    }

    #[test]
    fn test_derived_window() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(4.0);
        vp.set_offset(0.5);
        assert_eq!(vp.visible_duration(), 25.0);
        assert_eq!(vp.visible_start(), 50.0);
        assert_eq!(vp.visible_end(), 75.0);
    }

    #[test]
    fn test_offset_invariant_after_every_operation() {
        let mut vp = ViewportModel::new(37.3);
        for _ in 0..12 {
            vp.zoom_in();
            assert_invariant(&vp);
            vp.pan_by_time(5.0);
            assert_invariant(&vp);
        }
        vp.set_offset(2.0);
        assert_invariant(&vp);
        vp.center_on(37.3);
        assert_invariant(&vp);
        for _ in 0..15 {
            vp.zoom_out();
            assert_invariant(&vp);
        }
        assert_eq!(vp.zoom_level(), 1.0);
        assert_eq!(vp.zoom_offset(), 0.0);
        vp.zoom_in();
        vp.center_on(-10.0);
        assert_invariant(&vp);
        vp.reset_zoom();
        assert_invariant(&vp);
        assert_eq!(vp.zoom_offset(), 0.0);
    }

    #[test]
    fn test_zoom_capped() {
        let mut vp = ViewportModel::new(10.0);
        for _ in 0..20 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom_level(), MAX_ZOOM);
        for _ in 0..20 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom_level(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_preserves_center() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(4.0);
        vp.center_on(40.0);
        let before = vp.visible_start() + vp.visible_duration() / 2.0;
        vp.zoom_in();
        let after = vp.visible_start() + vp.visible_duration() / 2.0;
        assert!((before - after).abs() < 1e-9, "{before} vs {after}");
    }

    #[test]
    fn test_pixel_time_round_trip() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(8.0);
        vp.set_offset(0.3);
        let width = 800.0;
        let resolution = vp.seconds_per_pixel(width);
        let mut t = vp.visible_start();
        while t <= vp.visible_end() {
            let x = vp.time_to_pixel(t, width).round();
            let back = vp.pixel_to_time(x, width);
            assert!((back - t).abs() <= resolution, "t={t} back={back}");
            t += 0.37;
        }
    }

    #[test]
    fn test_center_on_example() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(4.0);
        vp.set_offset(0.0);
        vp.center_on(50.0);
        assert!((vp.zoom_offset() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_zero_duration_is_harmless() {
        let mut vp = ViewportModel::new(f64::NAN);
        vp.zoom_in();
        vp.center_on(3.0);
        assert_eq!(vp.duration(), 0.0);
        assert_eq!(vp.zoom_offset(), 0.0);
        assert_eq!(vp.time_to_pixel(1.0, 100.0), 0.0);
    }
}
