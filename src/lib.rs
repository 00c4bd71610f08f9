pub mod api;
pub mod config;
pub mod db;
pub mod seed;
pub mod store;

/// Application name for XDG paths
pub const APP_NAME: &str = "trackbox";
