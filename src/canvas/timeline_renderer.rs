use web_sys::CanvasRenderingContext2d;
use crate::canvas::colors;
use crate::canvas::segment_renderer::{SegmentLayout, MARKER_STRIP_HEIGHT};
use crate::canvas::time_markers::draw_time_markers;
use crate::viewport::ViewportModel;

/// Strip below the main view: time ticks on top, segment lane underneath.
pub fn draw_timeline(
    ctx: &CanvasRenderingContext2d,
    viewport: &ViewportModel,
    layout: &SegmentLayout,
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.set_fill_style_str(colors::BACKGROUND);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    draw_time_markers(
        ctx,
        viewport.visible_start(),
        viewport.visible_end(),
        canvas_width,
        MARKER_STRIP_HEIGHT,
    );

    ctx.set_stroke_style_str(colors::BASELINE);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(0.0, MARKER_STRIP_HEIGHT + 0.5);
    ctx.line_to(canvas_width, MARKER_STRIP_HEIGHT + 0.5);
    ctx.stroke();

    layout.draw(ctx, canvas_width, canvas_height);
}
