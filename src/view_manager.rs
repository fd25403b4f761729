//! Which base representation is shown, and the load state of each.
//!
//! The waveform loads with the recording. The spectrogram is fetched the
//! first time it is shown.

use web_sys::CanvasRenderingContext2d;
use crate::canvas::draw_status;
use crate::canvas::spectrogram_renderer::SpectrogramRenderer;
use crate::canvas::waveform_renderer::WaveformRenderer;
use crate::codec::payload::SpectrogramPayload;
use crate::error::ApiError;
use crate::types::{LoadState, ViewMode, WaveformData};
use crate::viewport::ViewportModel;

pub struct ViewManager {
    mode: ViewMode,
    waveform: LoadState<WaveformRenderer>,
    spectrogram: LoadState<SpectrogramRenderer>,
    /// Bumped whenever either load state changes.
    generation: u64,
}

impl ViewManager {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            waveform: LoadState::Idle,
            spectrogram: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn waveform(&self) -> &LoadState<WaveformRenderer> {
        &self.waveform
    }

    pub fn spectrogram(&self) -> &LoadState<SpectrogramRenderer> {
        &self.spectrogram
    }

    /// Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if self.mode == mode {
            return false;
        }
        log::debug!("View mode -> {}", mode.label());
        self.mode = mode;
        true
    }

    /// True when the spectrogram is shown but has not been requested yet.
    pub fn needs_spectrogram(&self) -> bool {
        self.mode == ViewMode::Spectrogram && matches!(self.spectrogram, LoadState::Idle)
    }

    pub fn start_waveform_load(&mut self) {
        self.waveform = LoadState::Loading { progress: None };
        self.generation += 1;
    }

    pub fn start_spectrogram_load(&mut self) {
        self.spectrogram = LoadState::Loading { progress: Some(0.0) };
        self.generation += 1;
    }

    pub fn set_spectrogram_progress(&mut self, progress: Option<f32>) {
        if let LoadState::Loading { .. } = self.spectrogram {
            self.spectrogram = LoadState::Loading { progress };
            self.generation += 1;
        }
    }

    /// Store the waveform. Returns its duration on success.
    pub fn finish_waveform(&mut self, result: Result<WaveformData, ApiError>) -> Option<f64> {
        self.generation += 1;
        match result {
            Ok(data) => {
                let duration = data.duration_secs;
                self.waveform = LoadState::Ready(WaveformRenderer::new(data));
                Some(duration)
            }
            Err(e) => {
                log::error!("Waveform load failed: {e}");
                self.waveform = LoadState::Failed(e.to_string());
                None
            }
        }
    }

    pub fn finish_spectrogram(&mut self, result: Result<SpectrogramPayload, ApiError>) {
        self.generation += 1;
        self.spectrogram = match result {
            Ok(payload) => LoadState::Ready(SpectrogramRenderer::new(payload)),
            Err(e) => {
                log::error!("Spectrogram load failed: {e}");
                LoadState::Failed(e.to_string())
            }
        };
    }

    /// Status line shown in place of the active view, if it is not ready.
    pub fn status_text(&self) -> Option<String> {
        match self.mode {
            ViewMode::Waveform => match &self.waveform {
                LoadState::Ready(_) => None,
                LoadState::Idle | LoadState::Loading { .. } => Some("Loading waveform\u{2026}".to_string()),
                LoadState::Failed(e) => Some(format!("Failed to load waveform: {e}")),
            },
            ViewMode::Spectrogram => match &self.spectrogram {
                LoadState::Ready(_) => None,
                LoadState::Idle | LoadState::Loading { progress: None } => {
                    Some("Loading spectrogram\u{2026}".to_string())
                }
                LoadState::Loading { progress: Some(p) } => {
                    Some(format!("Loading spectrogram\u{2026} {:.0}%", p * 100.0))
                }
                LoadState::Failed(e) => Some(format!("Failed to load spectrogram: {e}")),
            },
        }
    }

    /// Draw the active base view (or its status) over the whole canvas.
    pub fn draw_base(&self, ctx: &CanvasRenderingContext2d, viewport: &ViewportModel, width: u32, height: u32) {
        let (w, h) = (width as f64, height as f64);
        if let Some(text) = self.status_text() {
            draw_status(ctx, &text, w, h);
            return;
        }
        let view = viewport.visible_range();
        let duration = viewport.duration();
        match self.mode {
            ViewMode::Waveform => {
                if let Some(r) = self.waveform.ready() {
                    r.draw(ctx, view, duration, w, h);
                }
            }
            ViewMode::Spectrogram => {
                if let Some(r) = self.spectrogram.ready() {
                    r.draw(ctx, view, duration, width, height);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::payload::encode_payload;

    #[test]
    fn test_spectrogram_requested_once_when_shown() {
        let mut vm = ViewManager::new(ViewMode::Waveform);
        assert!(!vm.needs_spectrogram());
        assert!(vm.set_mode(ViewMode::Spectrogram));
        assert!(vm.needs_spectrogram());
        vm.start_spectrogram_load();
        assert!(!vm.needs_spectrogram());
        assert!(!vm.set_mode(ViewMode::Spectrogram));
    }

    #[test]
    fn test_progress_status() {
        let mut vm = ViewManager::new(ViewMode::Spectrogram);
        vm.start_spectrogram_load();
        vm.set_spectrogram_progress(Some(0.456));
        assert_eq!(vm.status_text().unwrap(), "Loading spectrogram\u{2026} 46%");
    }

    #[test]
    fn test_failures_become_status() {
        let mut vm = ViewManager::new(ViewMode::Waveform);
        vm.start_waveform_load();
        assert_eq!(vm.finish_waveform(Err(ApiError::Status(404))), None);
        assert_eq!(vm.status_text().unwrap(), "Failed to load waveform: server returned HTTP 404");
    }

    #[test]
    fn test_ready_views_have_no_status() {
        let mut vm = ViewManager::new(ViewMode::Waveform);
        let data = WaveformData { samples: vec![0.0; 10], duration_secs: 3.0 };
        assert_eq!(vm.finish_waveform(Ok(data)), Some(3.0));
        assert_eq!(vm.status_text(), None);

        vm.set_mode(ViewMode::Spectrogram);
        let payload = crate::codec::payload::decode_payload(&encode_payload(
            r#"{"n_freq_bins":1,"n_frames":2,"duration":3.0}"#,
            &[0x3C00, 0x0000],
        ))
        .unwrap();
        let before = vm.generation();
        vm.finish_spectrogram(Ok(payload));
        assert!(vm.generation() > before);
        assert_eq!(vm.status_text(), None);
    }
}
