//! Arena module spawning the sandbox scene the motion systems drive.
pub mod config;
pub mod plugin;
pub mod systems;

pub use plugin::ArenaPlugin;
