//! Click-versus-drag discrimination on the main view.
//!
//! A press becomes a drag once the pointer travels more than the move
//! threshold. On release it is still treated as a click (seek) if it never
//! became a drag, or if it was released within the click time window.

use crate::config::PlayerConfig;
use crate::viewport::ViewportModel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Down { x: f64, time_ms: f64 },
    Move { x: f64 },
    Up { x: f64, time_ms: f64 },
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    None,
    /// The viewport offset changed during a drag.
    Panned,
    /// A click at this (unclamped) time.
    Seek(f64),
    PanFinished,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Press {
    start_x: f64,
    start_offset: f64,
    start_time_ms: f64,
    dragging: bool,
}

#[derive(Clone, Debug)]
pub struct CanvasInteractionController {
    move_threshold_px: f64,
    max_click_ms: f64,
    press: Option<Press>,
}

impl CanvasInteractionController {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            move_threshold_px: config.click_move_threshold_px,
            max_click_ms: config.click_max_duration_ms,
            press: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.press.map_or(false, |p| p.dragging)
    }

    pub fn dispatch(&mut self, event: GestureEvent, viewport: &mut ViewportModel, width: f64) -> GestureOutcome {
        match event {
            GestureEvent::Down { x, time_ms } => {
                self.press = Some(Press {
                    start_x: x,
                    start_offset: viewport.zoom_offset(),
                    start_time_ms: time_ms,
                    dragging: false,
                });
                GestureOutcome::None
            }
            GestureEvent::Move { x } => {
                let Some(press) = self.press.as_mut() else {
                    return GestureOutcome::None;
                };
                let dx = x - press.start_x;
                if dx.abs() > self.move_threshold_px {
                    press.dragging = true;
                }
                if !press.dragging || !viewport.is_zoomed() || width <= 0.0 || viewport.duration() <= 0.0 {
                    return GestureOutcome::None;
                }
                let px_per_sec = width / viewport.visible_duration();
                let dt = -dx / px_per_sec;
                let before = viewport.zoom_offset();
                viewport.set_offset(press.start_offset + dt / viewport.duration());
                if viewport.zoom_offset() != before {
                    GestureOutcome::Panned
                } else {
                    GestureOutcome::None
                }
            }
            GestureEvent::Up { x, time_ms } => {
                let Some(press) = self.press.take() else {
                    return GestureOutcome::None;
                };
                let elapsed = time_ms - press.start_time_ms;
                if !press.dragging || elapsed < self.max_click_ms {
                    GestureOutcome::Seek(viewport.pixel_to_time(x, width))
                } else {
                    GestureOutcome::PanFinished
                }
            }
            GestureEvent::Leave => match self.press.take() {
                Some(p) if p.dragging => GestureOutcome::PanFinished,
                _ => GestureOutcome::None,
            },
        }
    }
}
