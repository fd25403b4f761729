pub mod app;
pub mod player;
pub mod status_bar;
pub mod toolbar;
