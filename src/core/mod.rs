//! Core module owning fixed-step timing and simulation-wide settings.
pub mod config;
pub mod plugin;

pub use plugin::CorePlugin;
