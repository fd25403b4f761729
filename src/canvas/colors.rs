/// Anchor colours of the spectrogram palette (dark purple → orange → pale yellow),
/// evenly spaced over [0, 1].
const PALETTE_ANCHORS: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

/// Fixed 256-entry colour lookup table for normalized magnitudes.
pub struct ColorLut {
    table: [[u8; 3]; 256],
}

impl ColorLut {
    pub fn new() -> Self {
        let mut table = [[0u8; 3]; 256];
        let segments = (PALETTE_ANCHORS.len() - 1) as f32;
        for (i, entry) in table.iter_mut().enumerate() {
            let pos = i as f32 / 255.0 * segments;
            let lo = (pos.floor() as usize).min(PALETTE_ANCHORS.len() - 2);
            let frac = pos - lo as f32;
            let a = PALETTE_ANCHORS[lo];
            let b = PALETTE_ANCHORS[lo + 1];
            for c in 0..3 {
                let v = a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac;
                entry[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        Self { table }
    }

    /// Look up a normalized value in [0, 1]. NaN maps to the lowest entry.
    #[inline]
    pub fn apply(&self, norm: f32) -> [u8; 3] {
        let n = if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) };
        self.table[(n * 255.0).round() as usize]
    }

    #[inline]
    pub fn entry(&self, idx: u8) -> [u8; 3] {
        self.table[idx as usize]
    }
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::new()
    }
}

// ── Fixed UI colours ──────────────────────────────────────────────────────

pub const BACKGROUND: &str = "#0a0a0a";
pub const STATUS_TEXT: &str = "#888";
pub const BASELINE: &str = "#333";

pub const WAVE_OUTLINE: &str = "rgba(120, 200, 160, 0.9)";
pub const WAVE_FILL_PEAK: &str = "rgba(90, 190, 140, 0.85)";
pub const WAVE_FILL_CENTER: &str = "rgba(30, 80, 60, 0.6)";

pub const CURSOR: &str = "rgba(255, 80, 80, 0.95)";
pub const SELECTION_FILL: &str = "rgba(50, 120, 200, 0.2)";
pub const SELECTION_START: &str = "rgba(80, 220, 120, 0.95)";
pub const SELECTION_END: &str = "rgba(240, 170, 60, 0.95)";

pub const SEGMENT_FILL: &str = "rgba(70, 130, 220, 0.35)";
pub const SEGMENT_STROKE: &str = "rgba(110, 170, 255, 0.9)";
pub const SEGMENT_FILL_HOVER: &str = "rgba(110, 170, 255, 0.55)";
pub const SEGMENT_FILL_SELECTED: &str = "rgba(240, 200, 80, 0.45)";
pub const SEGMENT_FILL_PENDING: &str = "rgba(140, 140, 140, 0.3)";
pub const SEGMENT_HANDLE: &str = "rgba(255, 255, 255, 0.85)";
pub const SEGMENT_LABEL: &str = "rgba(255, 255, 255, 0.85)";
pub const HOVER_GUIDE: &str = "rgba(110, 170, 255, 0.6)";

pub const FREQ_GUIDE: &str = "rgba(255, 255, 255, 0.18)";
pub const FREQ_LABEL: &str = "rgba(255, 255, 255, 0.6)";

/// Label for a frequency guide line.
pub fn freq_label(freq_hz: f64) -> String {
    if freq_hz >= 1000.0 {
        format!("{} kHz", (freq_hz / 1000.0).round() as u32)
    } else {
        format!("{} Hz", freq_hz.round() as u32)
    }
}
