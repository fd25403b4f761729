use leptos::prelude::*;
use crate::components::player::{Player, PlayerHandle};
use crate::components::status_bar::StatusBar;
use crate::components::toolbar::Toolbar;
use crate::config::PlayerConfig;
use crate::state::PlayerSession;

#[component]
pub fn App(config: PlayerConfig) -> impl IntoView {
    let has_recording = !config.recording_id.is_empty();
    let handle = PlayerHandle::new(PlayerSession::new(config));
    provide_context(handle);

    view! {
        <div class="app">
            {if has_recording {
                view! {
                    <Toolbar />
                    <Player />
                    <StatusBar />
                }.into_any()
            } else {
                view! {
                    <div class="empty-state">"No recording configured"</div>
                }.into_any()
            }}
        </div>
    }
}
