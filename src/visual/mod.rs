pub mod render;
pub mod scene;
