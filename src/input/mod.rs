//! Input module sampling named axes for input-driven motion.
pub mod axes;
pub mod plugin;

pub use plugin::InputPlugin;
