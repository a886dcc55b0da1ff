use std::rc::Rc;
use tokio::sync::{mpsc, watch};
use tokio::task;

use crate::bridge;
use crate::config::ExportConfig;
use crate::export::{DirectorySink, Exporter};
use crate::host;
use crate::popup::{auto_refresh, Popup};
use crate::registry::{DevtoolsEvent, DevtoolsHook, SceneRegistry};

/// Loads the configured files, announces their scenes and runs one export
/// through the bridge, the same way the panel would drive it.
///
/// Must run inside a `LocalSet`: the core shares scenes through `Rc`.
pub async fn run(config: ExportConfig) -> anyhow::Result<()> {
    let registry = SceneRegistry::shared();
    let mut hook = DevtoolsHook::new();
    hook.add_listener(|event| {
        if let DevtoolsEvent::Register { revision } = event {
            log::info!("Scene library registered (revision {revision})");
        }
    });
    SceneRegistry::attach(&registry, &mut hook);

    // Scenes live as long as the host keeps them here
    let mut scenes = Vec::new();
    for path in &config.scene_paths {
        scenes.extend(host::load_gltf_scenes(path)?);
    }
    host::announce(&mut hook, &scenes);
    log::info!("{} scenes observed", registry.borrow().len());

    let sink = DirectorySink::new(&config.output_dir)?;
    log::info!("Writing meshes to {}", sink.dir().display());
    let exporter = Exporter::new(Rc::clone(&registry), config.file_extension.clone());
    let (client, requests) = bridge::channel(config.request_timeout);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let core = task::spawn_local(bridge::serve(exporter, Box::new(sink), requests, events_tx));

    let (counts_tx, mut counts_rx) = watch::channel(None);
    let poller = task::spawn_local(auto_refresh(
        client.clone(),
        config.poll_interval,
        counts_tx,
    ));

    let mut popup = Popup::new(client, config.status_duration);
    popup.refresh().await;
    popup.apply_count_updates(&mut counts_rx);
    log::info!("Meshes found: {}", popup.mesh_count());

    if let Some(outcome) = popup.download_all().await {
        log::debug!("{} meshes attempted", outcome.attempted());
    }

    while let Ok(event) = events_rx.try_recv() {
        popup.handle_event(event);
    }

    if let Some(status) = popup.status() {
        log::info!("Status: {}", status.message);
    }
    if let Some(filename) = popup.last_download() {
        log::debug!("Last file written: {filename}");
    }

    poller.abort();
    drop(popup);
    core.await?;

    Ok(())
}
