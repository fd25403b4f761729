//! Transparent layer above the base view: selection, playback cursor and
//! segment hover guides.

use web_sys::CanvasRenderingContext2d;
use crate::canvas::colors;
use crate::types::Selection;
use crate::viewport::ViewportModel;

/// Selection geometry in canvas pixels (may extend past the canvas edges).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionMark {
    /// Only the start is set.
    Marker { x: f64 },
    /// Both ends set. `start_x`/`end_x` keep their identity for colouring;
    /// the fill spans `[left, right]`.
    Range { start_x: f64, end_x: f64, left: f64, right: f64 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayScene {
    pub selection: Option<SelectionMark>,
    pub cursor_x: Option<f64>,
    /// Full-height guides for a hovered segment.
    pub guides: Option<(f64, f64)>,
}

impl OverlayScene {
    pub fn build(
        viewport: &ViewportModel,
        selection: &Selection,
        hover_bounds: Option<(f64, f64)>,
        width: f64,
    ) -> Self {
        let to_x = |t: f64| viewport.time_to_pixel(t, width);

        let selection = match (selection.start, selection.end) {
            (Some(s), Some(e)) => Some(SelectionMark::Range {
                start_x: to_x(s),
                end_x: to_x(e),
                left: to_x(s.min(e)),
                right: to_x(s.max(e)),
            }),
            (Some(s), None) => Some(SelectionMark::Marker { x: to_x(s) }),
            // An end without a start has nothing to anchor to
            _ => None,
        };

        let t = viewport.current_time();
        let cursor_x = viewport.is_visible(t).then(|| to_x(t));

        let guides = hover_bounds.map(|(onset, offset)| (to_x(onset), to_x(offset)));

        Self { selection, cursor_x, guides }
    }

    pub fn draw(&self, ctx: &CanvasRenderingContext2d, canvas_width: f64, canvas_height: f64) {
        ctx.clear_rect(0.0, 0.0, canvas_width, canvas_height);
        let inside = |x: f64| x >= 0.0 && x <= canvas_width;

        match self.selection {
            Some(SelectionMark::Marker { x }) => {
                if inside(x) {
                    vline(ctx, x, canvas_height, colors::SELECTION_START, 1.5);
                }
            }
            Some(SelectionMark::Range { start_x, end_x, left, right }) => {
                let x0 = left.max(0.0);
                let x1 = right.min(canvas_width);
                if x1 > x0 {
                    ctx.set_fill_style_str(colors::SELECTION_FILL);
                    ctx.fill_rect(x0, 0.0, x1 - x0, canvas_height);
                }
                if inside(start_x) {
                    vline(ctx, start_x, canvas_height, colors::SELECTION_START, 1.5);
                }
                if inside(end_x) {
                    vline(ctx, end_x, canvas_height, colors::SELECTION_END, 1.5);
                }
            }
            None => {}
        }

        if let Some((a, b)) = self.guides {
            for x in [a, b] {
                if inside(x) {
                    vline(ctx, x, canvas_height, colors::HOVER_GUIDE, 1.0);
                }
            }
        }

        if let Some(x) = self.cursor_x {
            vline(ctx, x, canvas_height, colors::CURSOR, 1.5);
        }
    }
}

fn vline(ctx: &CanvasRenderingContext2d, x: f64, height: f64, color: &str, width: f64) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(width);
    ctx.begin_path();
    ctx.move_to(x, 0.0);
    ctx.line_to(x, height);
    ctx.stroke();
}
