//! Wallpaper Rater command-line front end: rate images and browse the
//! session history.

pub mod config;
pub mod render;
pub mod repl;
pub mod session;

pub use config::{load_effective_config, resolve_config_path, ConfigError, RaterConfig};
pub use session::RatingSession;
