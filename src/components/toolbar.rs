use leptos::prelude::*;
use crate::components::player::PlayerHandle;
use crate::state::PlayerAction;
use crate::types::format_clock;

#[component]
pub fn Toolbar() -> impl IntoView {
    let handle = expect_context::<PlayerHandle>();
    let session = handle.session;

    let is_playing = move || session.with(|s| s.is_playing());
    let has_selection = move || session.with(|s| s.selection.get().bounds().is_some());
    let has_segment = move || session.with(|s| s.selected().is_some());
    let can_zoom_out = move || session.with(|s| s.viewport.is_zoomed());

    let readout = move || {
        session.with(|s| {
            format!(
                "{} / {}",
                format_clock(s.viewport.current_time()),
                format_clock(s.viewport.duration())
            )
        })
    };
    let zoom_label = move || session.with(|s| format!("{:.1}\u{00d7}", s.viewport.zoom_level()));
    let mode_label = move || session.with(|s| s.view.mode().toggled().label());

    view! {
        <div class="toolbar">
            <button
                class=move || if is_playing() { "toolbar-btn active" } else { "toolbar-btn" }
                on:click=move |_| handle.perform(PlayerAction::TogglePlay)
                title="Play / pause (Space)"
            >{move || if is_playing() { "Pause" } else { "Play" }}</button>

            <span class="toolbar-readout">{readout}</span>

            <div class="toolbar-group">
                <button
                    class="toolbar-btn"
                    on:click=move |_| handle.perform(PlayerAction::ZoomIn)
                    title="Zoom in (+)"
                >"+"</button>
                <button
                    class="toolbar-btn"
                    disabled=move || !can_zoom_out()
                    on:click=move |_| handle.perform(PlayerAction::ZoomOut)
                    title="Zoom out (-)"
                >"\u{2212}"</button>
                <button
                    class="toolbar-btn"
                    disabled=move || !can_zoom_out()
                    on:click=move |_| handle.perform(PlayerAction::ResetZoom)
                    title="Reset zoom (0)"
                >"Fit"</button>
                <span class="toolbar-zoom">{zoom_label}</span>
            </div>

            <div class="toolbar-group">
                <button
                    class="toolbar-btn"
                    on:click=move |_| handle.perform(PlayerAction::MarkStart)
                    title="Mark selection start at playhead ([)"
                >"Start"</button>
                <button
                    class="toolbar-btn"
                    on:click=move |_| handle.perform(PlayerAction::MarkEnd)
                    title="Mark selection end at playhead (])"
                >"End"</button>
                <button
                    class="toolbar-btn"
                    disabled=move || !has_selection()
                    on:click=move |_| handle.perform(PlayerAction::PlaySelection)
                    title="Play selection (P)"
                >"Play sel."</button>
                <button
                    class="toolbar-btn"
                    disabled=move || !has_selection()
                    on:click=move |_| handle.perform(PlayerAction::CommitSelection)
                    title="Create segment from selection (Enter)"
                >"Add segment"</button>
                <button
                    class="toolbar-btn"
                    on:click=move |_| handle.perform(PlayerAction::ClearSelection)
                    title="Clear selection (Esc)"
                >"Clear"</button>
            </div>

            <button
                class="toolbar-btn"
                disabled=move || !has_segment()
                on:click=move |_| handle.perform(PlayerAction::DeleteSelected)
                title="Delete selected segment (Del)"
            >"Delete"</button>

            // Spacer
            <div style="flex: 1;"></div>

            <button
                class="toolbar-btn"
                on:click=move |_| handle.perform(PlayerAction::ToggleView)
                title="Switch view (V)"
            >{mode_label}</button>
        </div>
    }
}
