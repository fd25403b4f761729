use crate::types::Selection;
use crate::viewport::clamp_time;

/// Start/end marks set from the playhead or toolbar.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionModel {
    selection: Selection,
}

impl SelectionModel {
    pub fn get(&self) -> Selection {
        self.selection
    }

    pub fn mark_start(&mut self, t: f64, duration: f64) {
        self.selection.start = Some(clamp_time(t, duration));
    }

    /// Marking an end without a start anchors the start at 0.
    pub fn mark_end(&mut self, t: f64, duration: f64) {
        if self.selection.start.is_none() {
            self.selection.start = Some(0.0);
        }
        self.selection.end = Some(clamp_time(t, duration));
    }

    pub fn set(&mut self, start: f64, end: f64, duration: f64) {
        self.selection = Selection {
            start: Some(clamp_time(start, duration)),
            end: Some(clamp_time(end, duration)),
        };
    }

    /// Returns true if anything was cleared.
    pub fn clear(&mut self) -> bool {
        let had = !self.selection.is_empty();
        self.selection = Selection::default();
        had
    }
}
