use leptos::prelude::*;
use leptos::ev;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent};
use crate::api;
use crate::canvas::timeline_renderer::draw_timeline;
use crate::canvas::{get_canvas_ctx, sync_canvas_size};
use crate::interaction::gesture::GestureEvent;
use crate::keyboard::{action_for_key, is_editable_target};
use crate::playback::{MediaTransport, Transport};
use crate::state::{Command, PlayerAction, PlayerSession};

/// Interval of playhead polling while audio plays (ms).
const PLAYHEAD_POLL_MS: i32 = 40;

/// Everything a player's components share. Provided as context.
#[derive(Clone, Copy)]
pub struct PlayerHandle {
    pub session: RwSignal<PlayerSession>,
    pub audio: NodeRef<leptos::html::Audio>,
    fetch_timer: StoredValue<Option<i32>>,
    poll_timer: StoredValue<Option<i32>>,
    poll_cb: StoredValue<Option<Closure<dyn FnMut()>>, LocalStorage>,
}

impl PlayerHandle {
    pub fn new(session: PlayerSession) -> Self {
        Self {
            session: RwSignal::new(session),
            audio: NodeRef::new(),
            fetch_timer: StoredValue::new(None),
            poll_timer: StoredValue::new(None),
            poll_cb: StoredValue::new_local(None),
        }
    }

    fn transport(&self) -> Option<MediaTransport> {
        let audio = self.audio.get_untracked()?;
        Some(MediaTransport::new(audio.into()))
    }

    /// Run a session transition that needs the media transport.
    pub fn with_transport(
        self,
        f: impl FnOnce(&mut PlayerSession, &mut dyn Transport) -> Vec<Command>,
    ) {
        let Some(mut transport) = self.transport() else {
            log::warn!("Audio element not mounted");
            return;
        };
        let cmds = self.session.try_update(|s| f(s, &mut transport)).unwrap_or_default();
        run_commands(self, cmds);
    }

    /// Run a session transition that needs no transport.
    pub fn apply(self, f: impl FnOnce(&mut PlayerSession) -> Vec<Command>) {
        let cmds = self.session.try_update(f).unwrap_or_default();
        run_commands(self, cmds);
    }

    pub fn perform(self, action: PlayerAction) {
        if action == PlayerAction::DeleteSelected && !self.confirm_delete() {
            return;
        }
        self.with_transport(|s, t| s.perform(action, t));
    }

    fn confirm_delete(&self) -> bool {
        if self.session.with_untracked(|s| s.selected().is_none()) {
            return false;
        }
        web_sys::window()
            .and_then(|w| w.confirm_with_message("Delete the selected segment?").ok())
            .unwrap_or(false)
    }

    fn clear_fetch_timer(&self) {
        if let Some(id) = self.fetch_timer.get_value() {
            if let Some(win) = web_sys::window() {
                win.clear_timeout_with_handle(id);
            }
            self.fetch_timer.set_value(None);
        }
    }

    fn start_playhead_poll(self) {
        if self.poll_timer.get_value().is_some() {
            return;
        }
        let Some(win) = web_sys::window() else { return };
        if self.poll_cb.with_value(|cb| cb.is_none()) {
            let cb = Closure::<dyn FnMut()>::new(move || {
                let Some(mut transport) = self.transport() else { return };
                let t = transport.position();
                self.session.update(|s| s.on_time_update(t, &mut transport));
            });
            self.poll_cb.set_value(Some(cb));
        }
        let id = self.poll_cb.with_value(|cb| {
            let cb = cb.as_ref()?;
            win.set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), PLAYHEAD_POLL_MS)
                .map_err(|e| log::error!("Failed to start playhead timer: {:?}", e))
                .ok()
        });
        self.poll_timer.set_value(id);
    }

    fn stop_playhead_poll(&self) {
        if let Some(id) = self.poll_timer.get_value() {
            if let Some(win) = web_sys::window() {
                win.clear_interval_with_handle(id);
            }
            self.poll_timer.set_value(None);
        }
    }
}

/// Carry out the follow-up work of a session transition.
pub fn run_commands(handle: PlayerHandle, cmds: Vec<Command>) {
    for cmd in cmds {
        match cmd {
            Command::ScheduleSegmentFetch { ticket, delay_ms } => {
                handle.clear_fetch_timer();
                let Some(win) = web_sys::window() else { continue };
                let cb = Closure::once_into_js(move || {
                    handle.fetch_timer.set_value(None);
                    handle.apply(|s| s.fire_segment_fetch(ticket));
                });
                match win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms as i32) {
                    Ok(id) => handle.fetch_timer.set_value(Some(id)),
                    Err(e) => log::error!("Failed to schedule segment fetch: {:?}", e),
                }
            }
            Command::CancelSegmentFetch => handle.clear_fetch_timer(),
            Command::FetchSegments(range) => {
                let endpoints = handle.session.with_untracked(|s| s.endpoints().clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let result = api::fetch_segments_in_range(&endpoints, range).await;
                    handle.session.update(|s| s.on_segments_loaded(range, result));
                });
            }
            Command::LoadSpectrogram => {
                let endpoints = handle.session.with_untracked(|s| s.endpoints().clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let result = api::fetch_spectrogram(&endpoints, |p| {
                        handle.session.update(|s| s.on_spectrogram_progress(p));
                    })
                    .await;
                    handle.session.update(|s| s.on_spectrogram_loaded(result));
                });
            }
            Command::Create(req) => {
                let endpoints = handle.session.with_untracked(|s| s.endpoints().clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let result = api::create_segment(&endpoints, &req.body).await;
                    handle.session.update(|s| s.on_create_result(&req, result));
                });
            }
            Command::Update(req) => {
                let endpoints = handle.session.with_untracked(|s| s.endpoints().clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let result = api::update_segment(&endpoints, req.server_id, &req.body).await;
                    handle.session.update(|s| s.on_update_result(req.id, result));
                });
            }
            Command::Delete(req) => {
                let endpoints = handle.session.with_untracked(|s| s.endpoints().clone());
                wasm_bindgen_futures::spawn_local(async move {
                    let result = api::delete_segment(&endpoints, req.server_id).await;
                    handle.session.update(|s| s.on_delete_result(req, result));
                });
            }
        }
    }
}

/// Pointer x relative to the canvas, and the canvas display width.
fn pointer_x(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
    let canvas_el = canvas_ref.get_untracked()?;
    let rect = canvas_el.get_bounding_client_rect();
    Some((ev.client_x() as f64 - rect.left(), rect.width()))
}

#[component]
pub fn Player() -> impl IntoView {
    let handle = expect_context::<PlayerHandle>();
    let session = handle.session;
    let base_ref = NodeRef::<leptos::html::Canvas>::new();
    let overlay_ref = NodeRef::<leptos::html::Canvas>::new();
    let timeline_ref = NodeRef::<leptos::html::Canvas>::new();
    let size_tick = RwSignal::new(0u32);

    let audio_src = session.with_untracked(|s| s.endpoints().audio());

    // Kick off loading once
    handle.apply(|s| s.start_load());
    {
        let endpoints = session.with_untracked(|s| s.endpoints().clone());
        wasm_bindgen_futures::spawn_local(async move {
            let result = api::fetch_waveform(&endpoints).await;
            handle.apply(|s| s.on_waveform_loaded(result));
        });
    }

    // Base view: only when zoom, offset, mode or loaded data change
    let base_key = Memo::new(move |_| session.with(|s| s.base_key()));
    Effect::new(move || {
        base_key.track();
        size_tick.track();
        let Some(canvas_el) = base_ref.get() else { return };
        let canvas: &HtmlCanvasElement = canvas_el.as_ref();
        let Some((w, h)) = sync_canvas_size(canvas) else { return };
        let Some(ctx) = get_canvas_ctx(canvas) else { return };
        session.with_untracked(|s| s.view.draw_base(&ctx, &s.viewport, w, h));
    });

    // Overlay: selection, cursor, hover guides
    Effect::new(move || {
        size_tick.track();
        let Some(canvas_el) = overlay_ref.get() else { return };
        let canvas: &HtmlCanvasElement = canvas_el.as_ref();
        let Some((w, h)) = sync_canvas_size(canvas) else { return };
        let Some(ctx) = get_canvas_ctx(canvas) else { return };
        let scene = session.with(|s| s.overlay_scene(w as f64));
        scene.draw(&ctx, w as f64, h as f64);
    });

    // Timeline: ticks and segment boxes
    Effect::new(move || {
        size_tick.track();
        let Some(canvas_el) = timeline_ref.get() else { return };
        let canvas: &HtmlCanvasElement = canvas_el.as_ref();
        let Some((w, h)) = sync_canvas_size(canvas) else { return };
        let Some(ctx) = get_canvas_ctx(canvas) else { return };
        session.with(|s| {
            let layout = s.segment_layout(w as f64);
            draw_timeline(&ctx, &s.viewport, &layout, w as f64, h as f64);
        });
    });

    let resize = window_event_listener(ev::resize, move |_| size_tick.update(|n| *n += 1));
    let keys = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if let Some(target) = ev.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
            if is_editable_target(&target.tag_name(), target.is_content_editable()) {
                return;
            }
        }
        let modifier = ev.ctrl_key() || ev.meta_key() || ev.alt_key();
        let Some(action) = action_for_key(&ev.key(), modifier) else { return };
        ev.prevent_default();
        handle.perform(action);
    });
    on_cleanup(move || {
        resize.remove();
        keys.remove();
        handle.clear_fetch_timer();
        handle.stop_playhead_poll();
    });

    // ── Main view pointer handling ──

    let main_event = move |ev: &MouseEvent, make: &dyn Fn(f64) -> GestureEvent| {
        let Some((x, w)) = pointer_x(base_ref, ev) else { return };
        let event = make(x);
        handle.with_transport(|s, t| s.main_pointer(event, w, t));
    };

    let on_main_down = move |ev: PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(canvas_el) = base_ref.get_untracked() {
            let _ = canvas_el.set_pointer_capture(ev.pointer_id());
        }
        let time_ms = ev.time_stamp();
        main_event(&ev, &|x| GestureEvent::Down { x, time_ms });
    };
    let on_main_move = move |ev: PointerEvent| {
        main_event(&ev, &|x| GestureEvent::Move { x });
    };
    let on_main_up = move |ev: PointerEvent| {
        let time_ms = ev.time_stamp();
        main_event(&ev, &|x| GestureEvent::Up { x, time_ms });
    };
    let on_main_leave = move |_: PointerEvent| {
        handle.with_transport(|s, t| s.main_pointer(GestureEvent::Leave, 0.0, t));
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        let Some(canvas_el) = base_ref.get_untracked() else { return };
        let w = canvas_el.get_bounding_client_rect().width();
        let (dx, dy, ctrl) = (ev.delta_x(), ev.delta_y(), ev.ctrl_key() || ev.meta_key());
        handle.apply(|s| s.wheel(dx, dy, ctrl, w));
    };

    // ── Timeline pointer handling ──

    let on_tl_down = move |ev: PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        let Some((x, w)) = pointer_x(timeline_ref, &ev) else { return };
        let dragging = session.try_update(|s| s.timeline_pointer_down(x, w)).unwrap_or(false);
        if dragging {
            if let Some(canvas_el) = timeline_ref.get_untracked() {
                let _ = canvas_el.set_pointer_capture(ev.pointer_id());
            }
        }
    };
    let on_tl_move = move |ev: PointerEvent| {
        let Some((x, w)) = pointer_x(timeline_ref, &ev) else { return };
        session.update(|s| s.timeline_pointer_move(x, w));
    };
    let on_tl_up = move |_: PointerEvent| handle.apply(|s| s.timeline_pointer_up());
    let on_tl_leave = move |_: PointerEvent| handle.apply(|s| s.timeline_pointer_leave());
    let on_tl_dblclick = move |ev: MouseEvent| {
        let Some((x, w)) = pointer_x(timeline_ref, &ev) else { return };
        handle.with_transport(|s, t| s.timeline_double_click(x, w, t));
    };

    // ── Media element ──

    let on_time = move |_: web_sys::Event| {
        let Some(mut transport) = handle.transport() else { return };
        let t = transport.position();
        session.update(|s| s.on_time_update(t, &mut transport));
    };
    let on_play = move |_: web_sys::Event| {
        session.update(|s| s.on_play_state(true));
        handle.start_playhead_poll();
    };
    let on_stop = move |_: web_sys::Event| {
        handle.stop_playhead_poll();
        session.update(|s| s.on_play_state(false));
    };

    let tl_cursor = move || {
        if session.with(|s| s.drag().is_dragging()) { "cursor: ew-resize;" } else { "cursor: default;" }
    };

    view! {
        <div class="player">
            <div class="player-main">
                <canvas
                    class="player-base"
                    node_ref=base_ref
                    on:pointerdown=on_main_down
                    on:pointermove=on_main_move
                    on:pointerup=on_main_up
                    on:pointerleave=on_main_leave
                    on:wheel=on_wheel
                    style="cursor: crosshair;"
                />
                <canvas
                    class="player-overlay"
                    node_ref=overlay_ref
                    style="pointer-events: none;"
                />
            </div>
            <canvas
                class="player-timeline"
                node_ref=timeline_ref
                on:pointerdown=on_tl_down
                on:pointermove=on_tl_move
                on:pointerup=on_tl_up
                on:pointerleave=on_tl_leave
                on:dblclick=on_tl_dblclick
                style=tl_cursor
            />
            <audio
                node_ref=handle.audio
                src=audio_src
                preload="auto"
                on:timeupdate=on_time
                on:play=on_play
                on:pause=on_stop
                on:ended=on_stop
            />
        </div>
    }
}
