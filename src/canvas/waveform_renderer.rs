use web_sys::CanvasRenderingContext2d;
use crate::canvas::colors;
use crate::types::{TimeRange, WaveformData};

/// Fraction of the half-height used by a full-scale sample.
const HEADROOM: f64 = 0.9;

/// Sample index range `[start, end)` covering the visible time window.
///
/// Samples are treated as evenly spread over `duration`, the same time axis the
/// spectrogram frames use.
pub fn visible_index_range(len: usize, view: TimeRange, duration: f64) -> (usize, usize) {
    if len == 0 || duration <= 0.0 {
        return (0, 0);
    }
    let start = ((view.start / duration) * len as f64).floor().max(0.0) as usize;
    let end = ((view.end / duration) * len as f64).ceil().max(0.0) as usize;
    let start = start.min(len - 1);
    (start, end.clamp(start + 1, len))
}

/// Nearest-sample lookup for each output column.
pub fn column_values(samples: &[f32], range: (usize, usize), width: usize) -> Vec<f32> {
    let (start, end) = range;
    if width == 0 || start >= end || end > samples.len() {
        return Vec::new();
    }
    let count = end - start;
    (0..width)
        .map(|x| {
            // Column centre (x + 0.5) / width, in integer arithmetic
            let idx = (start + ((2 * x + 1) * count) / (2 * width)).min(end - 1);
            samples[idx]
        })
        .collect()
}

/// Stateless mirrored amplitude plot.
#[derive(Default)]
pub struct WaveformRenderer {
    data: WaveformData,
}

impl WaveformRenderer {
    pub fn new(data: WaveformData) -> Self {
        log::info!(
            "Waveform ready: {} samples over {:.2}s",
            data.samples.len(),
            data.duration_secs
        );
        Self { data }
    }

    pub fn draw(
        &self,
        ctx: &CanvasRenderingContext2d,
        view: TimeRange,
        duration: f64,
        canvas_width: f64,
        canvas_height: f64,
    ) {
        ctx.set_fill_style_str(colors::BACKGROUND);
        ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

        let mid_y = canvas_height / 2.0;
        let amp = mid_y * HEADROOM;

        // Center baseline
        ctx.set_stroke_style_str(colors::BASELINE);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(0.0, mid_y);
        ctx.line_to(canvas_width, mid_y);
        ctx.stroke();

        let range = visible_index_range(self.data.samples.len(), view, duration);
        let values = column_values(&self.data.samples, range, canvas_width as usize);
        if values.is_empty() {
            return;
        }

        let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, canvas_height);
        let _ = gradient.add_color_stop(0.0, colors::WAVE_FILL_PEAK);
        let _ = gradient.add_color_stop(0.5, colors::WAVE_FILL_CENTER);
        let _ = gradient.add_color_stop(1.0, colors::WAVE_FILL_PEAK);
        ctx.set_fill_style_canvas_gradient(&gradient);

        // Positive half, then negative half, each as its own filled path
        for positive in [true, false] {
            ctx.begin_path();
            ctx.move_to(0.0, mid_y);
            for (x, &v) in values.iter().enumerate() {
                let v = if positive { v.max(0.0) } else { v.min(0.0) } as f64;
                ctx.line_to(x as f64, mid_y - v * amp);
            }
            ctx.line_to((values.len() - 1) as f64, mid_y);
            ctx.close_path();
            ctx.fill();
        }

        // One-pixel outline
        ctx.set_stroke_style_str(colors::WAVE_OUTLINE);
        ctx.set_line_width(1.0);
        for positive in [true, false] {
            ctx.begin_path();
            for (x, &v) in values.iter().enumerate() {
                let v = if positive { v.max(0.0) } else { v.min(0.0) } as f64;
                let y = mid_y - v * amp;
                if x == 0 {
                    ctx.move_to(0.0, y);
                } else {
                    ctx.line_to(x as f64, y);
                }
            }
            ctx.stroke();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_view_covers_everything() {
        assert_eq!(visible_index_range(1000, TimeRange::new(0.0, 10.0), 10.0), (0, 1000));
    }

    #[test]
    fn test_zoomed_view_index_range() {
        // zoom 4, offset 0.25 on 100 s → [25, 50)
        let r = visible_index_range(1000, TimeRange::new(25.0, 50.0), 100.0);
        assert_eq!(r, (250, 500));
    }

    #[test]
    fn test_index_range_empty_inputs() {
        assert_eq!(visible_index_range(0, TimeRange::new(0.0, 1.0), 1.0), (0, 0));
        assert_eq!(visible_index_range(10, TimeRange::new(0.0, 1.0), 0.0), (0, 0));
    }

    #[test]
    fn test_nearest_sample_per_column() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        // 5 columns over 10 samples → centres land on samples 1, 3, 5, 7, 9
        let cols = column_values(&samples, (0, 10), 5);
        assert_eq!(cols, vec![0.1, 0.3, 0.5, 0.7, 0.9]);
    }

    #[test]
    fn test_upsampled_columns_repeat_samples() {
        let samples = [0.5f32, -0.5];
        let cols = column_values(&samples, (0, 2), 4);
        assert_eq!(cols, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_column_values_rejects_bad_range() {
        assert!(column_values(&[0.0; 4], (3, 8), 10).is_empty());
        assert!(column_values(&[0.0; 4], (0, 4), 0).is_empty());
    }
}
