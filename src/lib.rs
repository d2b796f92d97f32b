pub mod camera;
pub mod cli;
pub mod dispatch;
pub mod display;
pub mod math;
pub mod render;
pub mod scene;
pub mod scenes;
pub mod snapshot;
pub mod surfaces;

// Re-export scene constructors for backward compatibility
pub use scenes::{create_demo_scene, create_walls_scene};
