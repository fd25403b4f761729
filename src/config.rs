use serde::{Deserialize, Serialize};
use crate::types::ViewMode;

/// DOM id of the `<script type="application/json">` element holding the config.
pub const CONFIG_ELEMENT_ID: &str = "callmark-config";

/// Per-player settings. Every field has a default, so a partial JSON object
/// (or none at all) is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Prefix for every service URL, without trailing slash.
    pub api_base: String,
    pub recording_id: String,
    pub initial_view: ViewMode,
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,

    /// Pointer travel (px) after which a press becomes a drag.
    pub click_move_threshold_px: f64,
    /// Presses released sooner than this are always clicks.
    pub click_max_duration_ms: f64,

    pub loader_debounce_ms: u32,
    /// Fraction of the visible duration fetched beyond each edge.
    pub loader_padding: f64,
    /// Fraction of the visible duration a new range may differ from the last
    /// fetched one without triggering a refetch.
    pub loader_refetch_threshold: f64,

    /// Fraction of the region length added on each side when auto-zooming.
    pub region_padding: f64,
    pub region_max_zoom: f64,
    /// Auto-zoom only regions shorter than this fraction of the recording.
    pub region_autozoom_fraction: f64,

    /// Horizontal hit radius of a segment boundary handle (px).
    pub handle_hit_px: f64,
    /// Smallest allowed gap between onset and offset (s).
    pub min_segment_separation: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            recording_id: String::new(),
            initial_view: ViewMode::Waveform,
            log_level: "info".to_string(),
            click_move_threshold_px: 5.0,
            click_max_duration_ms: 150.0,
            loader_debounce_ms: 300,
            loader_padding: 0.2,
            loader_refetch_threshold: 0.1,
            region_padding: 0.2,
            region_max_zoom: 10.0,
            region_autozoom_fraction: 0.5,
            handle_hit_px: 5.0,
            min_segment_separation: 0.001,
        }
    }
}

impl PlayerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read the config from the page, falling back to defaults.
    pub fn load_from_page() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        let Some(text) = text else {
            log::warn!("No #{CONFIG_ELEMENT_ID} element, using default config");
            return Self::default();
        };
        match Self::from_json(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Invalid player config ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" => log::Level::Error,
            "warn" => log::Level::Warn,
            "debug" => log::Level::Debug,
            "trace" => log::Level::Trace,
            _ => log::Level::Info,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            base: self.api_base.trim_end_matches('/').to_string(),
            recording: self.recording_id.clone(),
        }
    }
}

/// Service URLs for one recording.
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoints {
    base: String,
    recording: String,
}

impl Endpoints {
    pub fn waveform(&self) -> String {
        format!("{}/recordings/{}/waveform", self.base, self.recording)
    }

    pub fn spectrogram(&self) -> String {
        format!("{}/recordings/{}/spectrogram", self.base, self.recording)
    }

    pub fn audio(&self) -> String {
        format!("{}/recordings/{}/audio", self.base, self.recording)
    }

    pub fn create_segment(&self) -> String {
        format!("{}/recordings/{}/segments", self.base, self.recording)
    }

    pub fn update_segment(&self, id: i64) -> String {
        format!("{}/segments/{}/edit", self.base, id)
    }

    pub fn delete_segment(&self, id: i64) -> String {
        format!("{}/segments/{}/delete", self.base, id)
    }

    pub fn segments_in_range(&self, start: f64, end: f64) -> String {
        format!(
            "{}/recordings/{}/segments?start_time={:.3}&end_time={:.3}",
            self.base, self.recording, start, end
        )
    }
}
