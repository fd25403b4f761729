use crate::playback::Transport;
use crate::viewport::{clamp_time, ViewportModel};

/// Move the playhead to `t` (clamped to the recording). When zoomed in, the
/// visible window is recentred on the new position. Returns the applied time.
pub fn seek<T: Transport + ?Sized>(viewport: &mut ViewportModel, transport: &mut T, t: f64) -> f64 {
    let t = clamp_time(t, viewport.duration());
    transport.set_position(t);
    viewport.set_current_time(t);
    if viewport.is_zoomed() {
        viewport.center_on(t);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fake::FakeTransport;

    #[test]
    fn test_seek_clamps() {
        let mut vp = ViewportModel::new(100.0);
        let mut tr = FakeTransport::default();
        assert_eq!(seek(&mut vp, &mut tr, -4.0), 0.0);
        assert_eq!(tr.position, 0.0);
        assert_eq!(seek(&mut vp, &mut tr, 250.0), 100.0);
        assert_eq!(tr.position, 100.0);
        assert_eq!(vp.current_time(), 100.0);
    }

    #[test]
    fn test_seek_recenters_when_zoomed() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(4.0);
        vp.set_offset(0.0);
        let mut tr = FakeTransport::default();
        seek(&mut vp, &mut tr, 50.0);
        assert!((vp.zoom_offset() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_seek_near_end_keeps_offset_valid() {
        let mut vp = ViewportModel::new(100.0);
        vp.set_zoom(4.0);
        let mut tr = FakeTransport::default();
        seek(&mut vp, &mut tr, 99.0);
        assert!((vp.zoom_offset() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_seek_unzoomed_leaves_viewport() {
        let mut vp = ViewportModel::new(100.0);
        let mut tr = FakeTransport::default();
        seek(&mut vp, &mut tr, 60.0);
        assert_eq!(vp.zoom_offset(), 0.0);
    }
}
