pub mod api;
pub mod canvas;
pub mod codec;
pub mod components;
pub mod config;
pub mod error;
pub mod interaction;
pub mod keyboard;
pub mod playback;
pub mod segments;
pub mod state;
pub mod types;
pub mod view_manager;
pub mod viewport;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use crate::components::app::App;
use crate::config::PlayerConfig;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Everything during config load, then the configured level
    console_log::init_with_level(log::Level::Trace).ok();
    let config = PlayerConfig::load_from_page();
    log::set_max_level(config.log_level().to_level_filter());
    log::info!("callmark {} starting, recording {:?}", env!("CARGO_PKG_VERSION"), config.recording_id);

    leptos::mount::mount_to_body(move || view! { <App config=config.clone() /> });
}
