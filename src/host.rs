use anyhow::{bail, Context};
use std::path::Path;

use crate::registry::{DevtoolsEvent, DevtoolsHook, ObservedObject};
use crate::scene_graph::{Scene, SceneHandle};

/// Loads every scene of a glTF file.
pub fn load_gltf_scenes(path: &Path) -> anyhow::Result<Vec<SceneHandle>> {
    let (document, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load {}", path.display()))?;

    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    scenes_from_document(&label, &document, &buffers)
}

/// Same as [`load_gltf_scenes`], for a glTF or GLB file already in memory.
#[allow(dead_code)]
pub fn load_gltf_slice(label: &str, bytes: &[u8]) -> anyhow::Result<Vec<SceneHandle>> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).with_context(|| format!("Failed to load {label}"))?;

    scenes_from_document(label, &document, &buffers)
}

fn scenes_from_document(
    label: &str,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> anyhow::Result<Vec<SceneHandle>> {
    let scenes = document
        .scenes()
        .map(|gltf_scene| {
            let name = gltf_scene
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("{} #{}", label, gltf_scene.index()));

            let mut scene = Scene::new(name);
            scene.spawn_gltf_scene(buffers, &gltf_scene);
            scene.into_handle()
        })
        .collect::<Vec<_>>();

    if scenes.is_empty() {
        bail!("No scenes in {label}");
    }

    log::info!("Loaded {} scenes from {}", scenes.len(), label);
    Ok(scenes)
}

/// Announces the scenes on the hook the way a page using the library would.
pub fn announce(hook: &mut DevtoolsHook, scenes: &[SceneHandle]) {
    hook.dispatch(DevtoolsEvent::Register {
        revision: env!("CARGO_PKG_VERSION").to_string(),
    });

    for scene in scenes {
        hook.dispatch(DevtoolsEvent::Observe(ObservedObject::Scene(
            SceneHandle::clone(scene),
        )));
    }
}
