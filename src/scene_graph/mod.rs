pub mod geometry;
pub mod object3d;
pub mod scene;

// Re-export main types for convenience
pub use geometry::BufferGeometry;
pub use object3d::ObjectId;
pub use scene::{Scene, SceneHandle};
