// scene/mod.rs

pub mod camera;
pub mod manager;

pub use camera::Camera;
pub use manager::{OrbitKey, SceneManager};
