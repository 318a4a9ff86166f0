pub mod app;
pub mod atlas;
pub mod config;
pub mod profile;
pub mod spotify;
pub mod store;
pub mod util;
