use crate::state::PlayerAction;

/// Map a `KeyboardEvent.key` value to a player action.
///
/// Keys combined with Ctrl/Meta/Alt are left to the browser.
pub fn action_for_key(key: &str, modifier: bool) -> Option<PlayerAction> {
    if modifier {
        return None;
    }
    let action = match key {
        " " | "Spacebar" => PlayerAction::TogglePlay,
        "+" | "=" => PlayerAction::ZoomIn,
        "-" | "_" => PlayerAction::ZoomOut,
        "0" => PlayerAction::ResetZoom,
        "[" => PlayerAction::MarkStart,
        "]" => PlayerAction::MarkEnd,
        "Enter" => PlayerAction::CommitSelection,
        "Escape" => PlayerAction::ClearSelection,
        "p" | "P" => PlayerAction::PlaySelection,
        "v" | "V" => PlayerAction::ToggleView,
        "Delete" | "Backspace" => PlayerAction::DeleteSelected,
        "ArrowLeft" => PlayerAction::Nudge(-1.0),
        "ArrowRight" => PlayerAction::Nudge(1.0),
        _ => return None,
    };
    Some(action)
}

/// True when keyboard focus is in a text field and shortcuts must not fire.
pub fn is_editable_target(tag_name: &str, content_editable: bool) -> bool {
    content_editable || matches!(tag_name.to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
}
