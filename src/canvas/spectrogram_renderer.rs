use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, ImageData};
use crate::canvas::colors::{self, freq_label, ColorLut};
use crate::codec::payload::SpectrogramPayload;
use crate::types::TimeRange;

/// Percentile used as the display floor.
const FLOOR_PERCENTILE: f64 = 0.01;

/// RGBA pixel buffer, row 0 at the top.
pub struct PreRendered {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Display bounds derived once per payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub min_val: f32,
    pub max_val: f32,
}

impl Normalization {
    /// `min_val` = 1st-percentile value (sorted index `floor(0.01 * n)`),
    /// `max_val` = maximum. Non-finite values are left out of both.
    pub fn from_values(values: &[f32]) -> Self {
        let mut sorted: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self { min_val: 0.0, max_val: 0.0 };
        }
        sorted.sort_unstable_by(f32::total_cmp);
        let idx = ((FLOOR_PERCENTILE * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
        Self {
            min_val: sorted[idx],
            max_val: sorted[sorted.len() - 1],
        }
    }

    pub fn value_range(&self) -> f32 {
        self.max_val - self.min_val
    }

    /// Map a raw value into [0, 1]. NaN and -inf go to 0, +inf to 1.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        let range = self.value_range();
        if range <= 0.0 {
            return if value > self.max_val { 1.0 } else { 0.0 };
        }
        ((value - self.min_val) / range).clamp(0.0, 1.0)
    }
}

/// Decoded spectrogram plus its normalization, ready to rasterize any view.
pub struct SpectrogramRenderer {
    payload: SpectrogramPayload,
    norm: Normalization,
    lut: ColorLut,
}

impl SpectrogramRenderer {
    pub fn new(payload: SpectrogramPayload) -> Self {
        let norm = Normalization::from_values(&payload.values);
        log::info!(
            "Spectrogram ready: {} bins x {} frames, range [{:.3}, {:.3}]",
            payload.meta.n_freq_bins,
            payload.meta.n_frames,
            norm.min_val,
            norm.max_val
        );
        Self { payload, norm, lut: ColorLut::new() }
    }

    pub fn normalization(&self) -> Normalization {
        self.norm
    }

    /// Frame index range covering `view`, using the recording duration as
    /// the shared time axis.
    pub fn frame_range(&self, view: TimeRange, duration: f64) -> (usize, usize) {
        let n = self.payload.meta.n_frames;
        if n == 0 || duration <= 0.0 {
            return (0, 0);
        }
        let start = ((view.start / duration) * n as f64).floor().max(0.0) as usize;
        let end = ((view.end / duration) * n as f64).ceil().max(0.0) as usize;
        let start = start.min(n - 1);
        let end = end.clamp(start + 1, n);
        (start, end)
    }

    /// Rasterize the visible window into a `width` x `height` RGBA buffer.
    /// Low frequencies at the bottom.
    pub fn rasterize(&self, view: TimeRange, duration: f64, width: u32, height: u32) -> PreRendered {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        let meta = &self.payload.meta;
        let n_bins = meta.n_freq_bins;
        let n_frames = meta.n_frames;
        if n_bins == 0 || n_frames == 0 || width == 0 || height == 0 {
            return PreRendered { width, height, pixels };
        }

        let (start_frame, end_frame) = self.frame_range(view, duration);
        let frame_count = end_frame - start_frame;

        // Frame index per column, frequency bin per row.
        let frames: Vec<usize> = (0..width)
            .map(|x| {
                let f = start_frame + (x as usize * frame_count) / width as usize;
                f.min(n_frames - 1)
            })
            .collect();

        for y in 0..height as usize {
            let from_bottom = (height as usize - 1 - y) * n_bins / height as usize;
            let freq = from_bottom.min(n_bins - 1);
            let row = &self.payload.values[freq * n_frames..(freq + 1) * n_frames];
            let out_row = y * width as usize * 4;
            for (x, &frame) in frames.iter().enumerate() {
                let rgb = self.lut.apply(self.norm.normalize(row[frame]));
                let i = out_row + x * 4;
                pixels[i] = rgb[0];
                pixels[i + 1] = rgb[1];
                pixels[i + 2] = rgb[2];
                pixels[i + 3] = 255;
            }
        }

        PreRendered { width, height, pixels }
    }

    /// Rasterize and blit the visible window onto `ctx`.
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, view: TimeRange, duration: f64, width: u32, height: u32) {
        let rendered = self.rasterize(view, duration, width, height);
        blit(ctx, &rendered);
        if let Some(nyquist) = self.payload.meta.nyquist() {
            draw_freq_guides(ctx, nyquist, width as f64, height as f64);
        }
    }
}

/// Put a pre-rendered buffer at the canvas origin.
pub fn blit(ctx: &CanvasRenderingContext2d, rendered: &PreRendered) {
    if rendered.width == 0 || rendered.height == 0 {
        return;
    }
    let image_data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(&rendered.pixels[..]),
        rendered.width,
        rendered.height,
    );
    match image_data {
        Ok(img) => {
            let _ = ctx.put_image_data(&img, 0.0, 0.0);
        }
        Err(e) => {
            log::error!("Failed to create ImageData: {e:?}");
        }
    }
}

/// Pick a guide spacing that gives roughly 4-8 lines up to `max_freq`.
pub fn freq_guide_step(max_freq: f64) -> f64 {
    const STEPS: &[f64] = &[
        100.0, 200.0, 500.0, 1_000.0, 2_000.0, 5_000.0, 10_000.0, 20_000.0, 50_000.0,
    ];
    STEPS
        .iter()
        .copied()
        .find(|&s| max_freq / s <= 8.0)
        .unwrap_or(100_000.0)
}

/// Horizontal frequency guides with labels; `max_freq` sits at the top edge.
pub fn draw_freq_guides(ctx: &CanvasRenderingContext2d, max_freq: f64, canvas_width: f64, canvas_height: f64) {
    if max_freq <= 0.0 {
        return;
    }
    let step = freq_guide_step(max_freq);
    ctx.set_line_width(1.0);
    ctx.set_font("10px sans-serif");
    let mut freq = step;
    while freq < max_freq {
        let y = canvas_height * (1.0 - freq / max_freq);
        ctx.set_stroke_style_str(colors::FREQ_GUIDE);
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(canvas_width, y);
        ctx.stroke();

        ctx.set_fill_style_str(colors::FREQ_LABEL);
        let _ = ctx.fill_text(&freq_label(freq), 4.0, y - 3.0);
        freq += step;
    }
}
