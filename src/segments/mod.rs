pub mod edit;
pub mod loader;
pub mod store;
