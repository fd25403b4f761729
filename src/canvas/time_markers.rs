use web_sys::CanvasRenderingContext2d;

// ── Time scale ────────────────────────────────────────────────────────────

/// Nice 1-2-5 progression of tick intervals in seconds, from 1 ms to 1 h.
const TICK_INTERVALS: &[f64] = &[
    0.001, 0.002, 0.005,             // 1–5 ms
    0.01, 0.02, 0.05,               // 10–50 ms
    0.1, 0.2, 0.5,                  // 100–500 ms
    1.0, 2.0, 5.0,                  // 1–5 s
    10.0, 30.0, 60.0,               // 10 s – 1 min
    120.0, 300.0, 600.0,            // 2–10 min
    1800.0, 3600.0,                 // 30 min – 1 h
];

/// Minimum spacing between labelled ticks.
const MIN_LABEL_SPACING_PX: f64 = 100.0;

/// Smallest nice interval that keeps labels at least 100 px apart.
pub fn pick_interval(px_per_sec: f64) -> f64 {
    let last = TICK_INTERVALS[TICK_INTERVALS.len() - 1];
    if px_per_sec <= 0.0 || !px_per_sec.is_finite() {
        return last;
    }
    let min_interval = MIN_LABEL_SPACING_PX / px_per_sec;
    TICK_INTERVALS
        .iter()
        .copied()
        .find(|&i| i >= min_interval)
        .unwrap_or(last)
}

/// Multiples of `interval` inside `[start, end]`.
pub fn tick_times(start: f64, end: f64, interval: f64) -> Vec<f64> {
    if interval <= 0.0 || end < start {
        return Vec::new();
    }
    let first = (start / interval).ceil() as i64;
    let last = ((end + interval * 0.01) / interval).floor() as i64;
    (first..=last).map(|k| k as f64 * interval).collect()
}

/// Format a time value as a compact label whose precision matches the tick interval.
pub fn format_time_label(seconds: f64, interval: f64) -> String {
    if interval < 1.0 {
        let ms = seconds * 1000.0;
        if interval >= 0.01 {
            format!("{:.0}ms", ms)
        } else {
            format!("{:.1}ms", ms)
        }
    } else if interval < 60.0 {
        if (seconds - seconds.round()).abs() < 0.001 {
            format!("{:.0}s", seconds)
        } else {
            format!("{:.1}s", seconds)
        }
    } else {
        let total = seconds.round() as u64;
        let hours = total / 3600;
        let mins = (total % 3600) / 60;
        let secs = total % 60;
        if hours > 0 {
            format!("{}h{:02}m", hours, mins)
        } else if secs == 0 {
            format!("{}m", mins)
        } else {
            format!("{}m{:02}s", mins, secs)
        }
    }
}

/// Draw time tick marks and labels along the top of the timeline strip.
pub fn draw_time_markers(
    ctx: &CanvasRenderingContext2d,
    visible_start: f64,
    visible_end: f64,
    canvas_width: f64,
    strip_height: f64,
) {
    let visible_time = visible_end - visible_start;
    if visible_time <= 0.0 || canvas_width <= 0.0 {
        return;
    }

    let px_per_sec = canvas_width / visible_time;
    let interval = pick_interval(px_per_sec);

    // ── Minor ticks (no labels) ──
    let minor_interval = interval / 5.0;
    if minor_interval * px_per_sec >= 4.0 {
        ctx.set_stroke_style_str("rgba(255,255,255,0.15)");
        ctx.set_line_width(1.0);
        for t in tick_times(visible_start, visible_end, minor_interval) {
            // Skip major-tick positions
            if ((t / interval).round() * interval - t).abs() < minor_interval * 0.01 {
                continue;
            }
            let x = (t - visible_start) * px_per_sec;
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, 5.0);
            ctx.stroke();
        }
    }

    // ── Major ticks + labels ──
    let tick_h = 10.0;
    ctx.set_font("10px sans-serif");
    ctx.set_text_baseline("top");

    for t in tick_times(visible_start, visible_end, interval) {
        let x = (t - visible_start) * px_per_sec;
        if x < 0.0 || x > canvas_width {
            continue;
        }
        ctx.set_stroke_style_str("rgba(255,255,255,0.35)");
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, tick_h);
        ctx.stroke();

        let label = format_time_label(t, interval);
        if let Ok(metrics) = ctx.measure_text(&label) {
            let tw = metrics.width();
            let lx = x + 3.0;
            if lx + tw < canvas_width - 2.0 && tick_h + 12.0 <= strip_height {
                ctx.set_fill_style_str("rgba(255,255,255,0.7)");
                let _ = ctx.fill_text(&label, lx, 2.0);
            }
        }
    }

    ctx.set_text_baseline("alphabetic"); // reset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_interval_keeps_labels_apart() {
        // 800 px for 10 s → 80 px/s → need ≥1.25 s → 2 s
        assert_eq!(pick_interval(80.0), 2.0);
        // 800 px for 20 ms → 40000 px/s → 2.5 ms → 5 ms
        assert_eq!(pick_interval(40_000.0), 0.005);
        // very long recording
        assert_eq!(pick_interval(0.001), 3600.0);
        assert_eq!(pick_interval(0.0), 3600.0);
    }

    #[test]
    fn test_tick_times() {
        let ticks = tick_times(0.5, 4.0, 1.0);
        assert_eq!(ticks, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(tick_times(5.0, 4.0, 1.0).is_empty());
    }

    #[test]
    fn test_format_time_label() {
        assert_eq!(format_time_label(0.25, 0.05), "250ms");
        assert_eq!(format_time_label(0.0025, 0.001), "2.5ms");
        assert_eq!(format_time_label(12.0, 2.0), "12s");
        assert_eq!(format_time_label(150.0, 60.0), "2m30s");
        assert_eq!(format_time_label(120.0, 60.0), "2m");
        assert_eq!(format_time_label(5400.0, 1800.0), "1h30m");
    }
}
