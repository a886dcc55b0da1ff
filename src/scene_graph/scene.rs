use id_arena::Arena;
use std::cell::RefCell;
use std::rc::Rc;

use crate::scene_graph::geometry::{Buffers, BufferGeometry, GeometryId};
use crate::scene_graph::object3d::{Object3D, ObjectId};

/// A scene shared between the host that owns it and anything observing it.
/// Identity is the allocation, not the contents.
pub type SceneHandle = Rc<RefCell<Scene>>;

pub struct Scene {
    pub name: String,
    pub objects: Arena<Object3D>,
    pub geometries: Arena<BufferGeometry>,
    root: ObjectId,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        let mut objects = Arena::new();
        let root = objects.alloc(Object3D::group("Scene"));

        Self {
            name: name.into(),
            objects,
            geometries: Arena::new(),
            root,
        }
    }

    pub fn into_handle(self) -> SceneHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_geometry(&mut self, geometry: BufferGeometry) -> GeometryId {
        self.geometries.alloc(geometry)
    }

    pub fn get_geometry(&self, id: GeometryId) -> Option<&BufferGeometry> {
        self.geometries.get(id)
    }

    /// Geometry of an object, if it references one that exists.
    pub fn object_geometry(&self, id: ObjectId) -> Option<&BufferGeometry> {
        self.get_object(id)
            .and_then(|object| object.geometry)
            .and_then(|geometry_id| self.get_geometry(geometry_id))
    }

    /// Adds `object` under `parent` and returns its id.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent));
        object_id
    }

    /// Convenience for building scenes by hand: allocates the geometry and a
    /// mesh node referencing it under `parent`.
    #[allow(dead_code)]
    pub fn add_mesh(
        &mut self,
        parent: ObjectId,
        name: impl Into<String>,
        geometry: BufferGeometry,
    ) -> ObjectId {
        let geometry_id = self.add_geometry(geometry);
        self.add_child(parent, Object3D::mesh(name, Some(geometry_id)))
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        // Remove from old parent's children list
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }
    }

    /// Builds the node tree of a glTF scene under the root.
    pub fn spawn_gltf_scene(&mut self, buffers: Buffers, scene: &gltf::Scene) {
        let root = self.root;

        for node in scene.nodes() {
            self.spawn_gltf_node(buffers, &node, root);
        }
    }

    fn spawn_gltf_node(&mut self, buffers: Buffers, node: &gltf::Node, parent: ObjectId) {
        let node_name = node.name().unwrap_or_default().to_string();
        let object_id = self.add_child(parent, Object3D::group(node_name.clone()));

        if let Some(mesh) = node.mesh() {
            let primitives = mesh.primitives().collect::<Vec<_>>();

            if let [primitive] = primitives.as_slice() {
                // Single primitive: the node itself is the mesh
                let (is_mesh, geometry_id) = self.spawn_gltf_primitive(buffers, primitive);
                if let Some(object) = self.objects.get_mut(object_id) {
                    object.is_mesh = is_mesh;
                    object.geometry = Some(geometry_id);
                }
            } else {
                for primitive in &primitives {
                    let (is_mesh, geometry_id) = self.spawn_gltf_primitive(buffers, primitive);
                    let child = Object3D {
                        name: format!("{}_{}", node_name, primitive.index()),
                        is_mesh,
                        geometry: Some(geometry_id),
                        ..Default::default()
                    };
                    self.add_child(object_id, child);
                }
            }
        }

        for child in node.children() {
            self.spawn_gltf_node(buffers, &child, object_id);
        }
    }

    /// Points and lines keep their geometry but are not meshes.
    fn spawn_gltf_primitive(
        &mut self,
        buffers: Buffers,
        primitive: &gltf::Primitive,
    ) -> (bool, GeometryId) {
        let is_mesh = primitive.mode() == gltf::mesh::Mode::Triangles;
        if !is_mesh {
            log::debug!(
                "Primitive {} uses mode {:?}, not exporting it as a mesh",
                primitive.index(),
                primitive.mode()
            );
        }

        let geometry_id = self.add_geometry(BufferGeometry::from_gltf(primitive, buffers));
        (is_mesh, geometry_id)
    }
}
