pub mod gesture;
pub mod segment_drag;
pub mod selection;
