use serde::{Deserialize, Serialize};

/// Identity of a segment in the local cache.
///
/// Segments created in this session carry a `Local` placeholder until the
/// server assigns a real id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "i64")]
pub enum SegmentId {
    Server(i64),
    Local(u32),
}

impl From<i64> for SegmentId {
    fn from(id: i64) -> Self {
        SegmentId::Server(id)
    }
}

impl SegmentId {
    pub fn server_id(self) -> Option<i64> {
        match self {
            SegmentId::Server(id) => Some(id),
            SegmentId::Local(_) => None,
        }
    }

    pub fn is_local(self) -> bool {
        matches!(self, SegmentId::Local(_))
    }
}

/// A labeled time interval on the recording. `onset < offset`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub onset: f64,
    pub offset: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Segment {
    /// Strict overlap: touching boundaries do not count.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.onset < end && start < self.offset
    }
}

/// Closed time range in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// In-progress or committed selection on the main view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Selection {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Selection {
    /// Both ends set, returned as `(min, max)`.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.start, self.end) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Downsampled amplitude envelope, values in [-1, 1].
#[derive(Clone, Debug, Default)]
pub struct WaveformData {
    pub samples: Vec<f32>,
    pub duration_secs: f64,
}

/// Which base representation the main view shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Waveform,
    Spectrogram,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Waveform => ViewMode::Spectrogram,
            ViewMode::Spectrogram => ViewMode::Waveform,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Waveform => "Waveform",
            ViewMode::Spectrogram => "Spectrogram",
        }
    }
}

/// Load lifecycle of an asynchronously fetched resource.
#[derive(Clone, Debug)]
pub enum LoadState<T> {
    Idle,
    Loading { progress: Option<f32> },
    Ready(T),
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Idle
    }
}

impl<T> LoadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-facing status line.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// Format seconds as `m:ss.mmm`.
pub fn format_clock(seconds: f64) -> String {
    let s = seconds.max(0.0);
    let total_ms = (s * 1000.0).round() as u64;
    let mins = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let ms = total_ms % 1000;
    format!("{}:{:02}.{:03}", mins, secs, ms)
}
