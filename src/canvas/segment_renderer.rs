//! Segment boxes on the timeline strip, boundary handles, hit testing and
//! hover state.

use web_sys::CanvasRenderingContext2d;
use crate::canvas::colors;
use crate::types::{Segment, SegmentId};
use crate::viewport::ViewportModel;

/// Height reserved above the segment lane for time markers.
pub const MARKER_STRIP_HEIGHT: f64 = 18.0;
const HANDLE_WIDTH: f64 = 4.0;
const LABEL_MIN_WIDTH: f64 = 24.0;

/// Which end of a segment a handle edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    Onset,
    Offset,
}

/// Draw state of one segment box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxStyle {
    Normal,
    Hovered,
    Selected,
    /// Awaiting server confirmation (create or delete).
    Pending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentBox {
    pub id: SegmentId,
    /// Unclipped pixel extent.
    pub x0: f64,
    pub x1: f64,
    /// Handles are offered only for segments fully inside the visible window.
    pub has_handles: bool,
    pub label: Option<String>,
    pub style: BoxStyle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentHit {
    Handle { id: SegmentId, boundary: Boundary },
    Body { id: SegmentId },
}

/// Pixel layout of all segments overlapping the visible window.
#[derive(Clone, Debug, Default)]
pub struct SegmentLayout {
    pub boxes: Vec<SegmentBox>,
}

impl SegmentLayout {
    pub fn build<'a>(
        segments: impl IntoIterator<Item = &'a Segment>,
        viewport: &ViewportModel,
        width: f64,
        style_of: impl Fn(&Segment) -> BoxStyle,
    ) -> Self {
        let vs = viewport.visible_start();
        let ve = viewport.visible_end();
        let boxes = segments
            .into_iter()
            .filter(|s| s.offset > vs && s.onset < ve)
            .map(|s| {
                let style = style_of(s);
                SegmentBox {
                    id: s.id,
                    x0: viewport.time_to_pixel(s.onset, width),
                    x1: viewport.time_to_pixel(s.offset, width),
                    has_handles: s.onset >= vs && s.offset <= ve && style != BoxStyle::Pending,
                    label: s.name.clone(),
                    style,
                }
            })
            .collect();
        Self { boxes }
    }

    /// Boundary handles win over bodies; among handles the nearest wins.
    pub fn hit_test(&self, x: f64, handle_radius: f64) -> Option<SegmentHit> {
        let mut best: Option<(f64, SegmentHit)> = None;
        for b in self.boxes.iter().filter(|b| b.has_handles) {
            for (edge_x, boundary) in [(b.x0, Boundary::Onset), (b.x1, Boundary::Offset)] {
                let d = (x - edge_x).abs();
                if d <= handle_radius && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, SegmentHit::Handle { id: b.id, boundary }));
                }
            }
        }
        if let Some((_, hit)) = best {
            return Some(hit);
        }
        self.boxes
            .iter()
            .find(|b| x >= b.x0 && x <= b.x1)
            .map(|b| SegmentHit::Body { id: b.id })
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d, canvas_width: f64, canvas_height: f64) {
        let top = MARKER_STRIP_HEIGHT + 2.0;
        let h = (canvas_height - top - 2.0).max(4.0);
        ctx.set_font("11px sans-serif");
        ctx.set_text_baseline("middle");

        for b in &self.boxes {
            let x0 = b.x0.max(0.0);
            let x1 = b.x1.min(canvas_width);
            if x1 <= x0 {
                continue;
            }
            let fill = match b.style {
                BoxStyle::Normal => colors::SEGMENT_FILL,
                BoxStyle::Hovered => colors::SEGMENT_FILL_HOVER,
                BoxStyle::Selected => colors::SEGMENT_FILL_SELECTED,
                BoxStyle::Pending => colors::SEGMENT_FILL_PENDING,
            };
            ctx.set_fill_style_str(fill);
            ctx.fill_rect(x0, top, x1 - x0, h);
            ctx.set_stroke_style_str(colors::SEGMENT_STROKE);
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x0 + 0.5, top + 0.5, (x1 - x0 - 1.0).max(0.0), h - 1.0);

            if b.has_handles {
                ctx.set_fill_style_str(colors::SEGMENT_HANDLE);
                ctx.fill_rect(b.x0 - HANDLE_WIDTH / 2.0, top, HANDLE_WIDTH, h);
                ctx.fill_rect(b.x1 - HANDLE_WIDTH / 2.0, top, HANDLE_WIDTH, h);
            }

            if let Some(label) = &b.label {
                if x1 - x0 >= LABEL_MIN_WIDTH {
                    ctx.save();
                    ctx.begin_path();
                    ctx.rect(x0, top, x1 - x0, h);
                    ctx.clip();
                    ctx.set_fill_style_str(colors::SEGMENT_LABEL);
                    let _ = ctx.fill_text(label, x0 + HANDLE_WIDTH + 2.0, top + h / 2.0);
                    ctx.restore();
                }
            }
        }

        ctx.set_text_baseline("alphabetic");
    }
}

/// Cosmetic hover state. Cleared on pointer-leave and on every full redraw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentHoverEffects {
    hovered: Option<SegmentId>,
}

impl SegmentHoverEffects {
    pub fn hovered(&self) -> Option<SegmentId> {
        self.hovered
    }

    /// Returns true when the hovered segment changed.
    pub fn enter(&mut self, id: SegmentId) -> bool {
        let changed = self.hovered != Some(id);
        self.hovered = Some(id);
        changed
    }

    pub fn leave(&mut self) -> bool {
        self.hovered.take().is_some()
    }
}
