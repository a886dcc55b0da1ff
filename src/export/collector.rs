use crate::scene_graph::{ObjectId, Scene, SceneHandle};

/// A collected mesh node and the scene it was reached through.
#[derive(Clone)]
pub struct CollectedMesh {
    pub scene: SceneHandle,
    pub object_id: ObjectId,
}

/// Depth-first, pre-order collection of mesh nodes below (and including)
/// `object_id`.
///
/// The graph must be acyclic: there is no visited set, so a cycle recurses
/// until the stack runs out.
pub fn collect_meshes(
    scene: &Scene,
    object_id: Option<ObjectId>,
    mut meshes: Vec<ObjectId>,
) -> Vec<ObjectId> {
    let Some((id, object)) = object_id.and_then(|id| scene.get_object(id).map(|o| (id, o))) else {
        return meshes;
    };

    if object.is_collectable() {
        meshes.push(id);
    }

    for &child_id in &object.child_ids {
        meshes = collect_meshes(scene, Some(child_id), meshes);
    }

    meshes
}

/// Meshes across every scene, in scene order.
pub fn collect_all(scenes: &[SceneHandle]) -> Vec<CollectedMesh> {
    let mut all_meshes = Vec::new();

    for handle in scenes {
        let scene = handle.borrow();
        let meshes = collect_meshes(&scene, Some(scene.root()), Vec::new());
        log::debug!("Scene {:?}: {} meshes", scene.name, meshes.len());

        all_meshes.extend(meshes.into_iter().map(|object_id| CollectedMesh {
            scene: SceneHandle::clone(handle),
            object_id,
        }));
    }

    all_meshes
}
