pub mod colors;
pub mod overlay_renderer;
pub mod segment_renderer;
pub mod spectrogram_renderer;
pub mod time_markers;
pub mod timeline_renderer;
pub mod waveform_renderer;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub fn get_canvas_ctx(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Match the canvas backing store to its displayed size.
/// Returns the size, or `None` while the canvas is not laid out.
pub fn sync_canvas_size(canvas: &HtmlCanvasElement) -> Option<(u32, u32)> {
    let rect = canvas.get_bounding_client_rect();
    let w = rect.width() as u32;
    let h = rect.height() as u32;
    if w == 0 || h == 0 {
        return None;
    }
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }
    Some((w, h))
}

/// Centred status text in place of a view.
pub fn draw_status(ctx: &CanvasRenderingContext2d, text: &str, canvas_width: f64, canvas_height: f64) {
    ctx.set_fill_style_str(colors::BACKGROUND);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);
    ctx.set_fill_style_str(colors::STATUS_TEXT);
    ctx.set_font("12px system-ui");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(text, canvas_width / 2.0, canvas_height / 2.0);
    ctx.set_text_align("start");
    ctx.set_text_baseline("alphabetic");
}
