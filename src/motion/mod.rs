//! Motion module: orbit controllers, linear movers, and rapier-driven dynamic bodies.
pub mod capabilities;
pub mod components;
pub mod config;
pub mod controller;
pub mod errors;
pub mod events;
pub mod plugin;
pub mod systems;

pub use plugin::MotionPlugin;
