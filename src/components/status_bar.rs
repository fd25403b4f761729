use leptos::prelude::*;
use crate::components::player::PlayerHandle;
use crate::types::NoticeLevel;

/// Most recent notice, dismissable.
#[component]
pub fn StatusBar() -> impl IntoView {
    let handle = expect_context::<PlayerHandle>();
    let session = handle.session;

    let notice = move || session.with(|s| s.latest_notice().cloned());

    view! {
        <div class="status-bar">
            {move || notice().map(|n| {
                let class = match n.level {
                    NoticeLevel::Info => "status-notice",
                    NoticeLevel::Error => "status-notice error",
                };
                view! {
                    <span class=class>{n.text}</span>
                    <button
                        class="status-dismiss"
                        on:click=move |_| session.update(|s| s.dismiss_notice())
                        title="Dismiss"
                    >"\u{00d7}"</button>
                }
            })}
        </div>
    }
}
