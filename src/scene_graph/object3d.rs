use id_arena::Id;

use crate::scene_graph::geometry::GeometryId;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub is_mesh: bool,
    pub geometry: Option<GeometryId>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn mesh(name: impl Into<String>, geometry: Option<GeometryId>) -> Self {
        Self {
            name: name.into(),
            is_mesh: true,
            geometry,
            ..Default::default()
        }
    }

    /// A mesh-flagged node with a geometry reference. The geometry itself is
    /// not inspected here.
    pub fn is_collectable(&self) -> bool {
        self.is_mesh && self.geometry.is_some()
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_mesh: false,
            geometry: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
