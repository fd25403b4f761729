pub mod play_region;
pub mod seek;

use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlMediaElement;

/// Playback position and play state of the underlying media.
pub trait Transport {
    fn position(&self) -> f64;
    fn set_position(&mut self, t: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// `Transport` backed by an `<audio>` element.
#[derive(Clone, Debug)]
pub struct MediaTransport {
    el: HtmlMediaElement,
}

impl MediaTransport {
    pub fn new(el: HtmlMediaElement) -> Self {
        Self { el }
    }
}

impl Transport for MediaTransport {
    fn position(&self) -> f64 {
        self.el.current_time()
    }

    fn set_position(&mut self, t: f64) {
        self.el.set_current_time(t);
    }

    fn play(&mut self) {
        let promise = match self.el.play() {
            Ok(p) => p,
            Err(e) => {
                log::error!("Audio play failed: {:?}", e);
                return;
            }
        };
        // Autoplay policy rejections surface here
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Audio play rejected: {:?}", e);
            }
        });
    }

    fn pause(&mut self) {
        if let Err(e) = self.el.pause() {
            log::error!("Audio pause failed: {:?}", e);
        }
    }

    fn is_playing(&self) -> bool {
        !self.el.paused()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::Transport;

    /// In-memory transport that records calls.
    #[derive(Clone, Debug, Default)]
    pub struct FakeTransport {
        pub position: f64,
        pub playing: bool,
        pub play_calls: u32,
        pub pause_calls: u32,
    }

    impl Transport for FakeTransport {
        fn position(&self) -> f64 {
            self.position
        }

        fn set_position(&mut self, t: f64) {
            self.position = t;
        }

        fn play(&mut self) {
            self.playing = true;
            self.play_calls += 1;
        }

        fn pause(&mut self) {
            self.playing = false;
            self.pause_calls += 1;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }
    }
}
