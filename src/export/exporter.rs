use std::time::{SystemTime, UNIX_EPOCH};

use crate::export::collector::{collect_all, CollectedMesh};
use crate::export::obj::mesh_to_obj;
use crate::export::sink::DownloadSink;
use crate::registry::SharedRegistry;

pub const NOTHING_TO_EXPORT_NOTICE: &str =
    "No meshes found on this page. Make sure the page uses Three.js and has loaded 3D content.";

/// Name and file name of one mesh within one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRecord {
    pub name: String,
    pub filename: String,
}

impl MeshRecord {
    pub fn new(mesh_name: &str, index: usize, timestamp: u128, extension: &str) -> Self {
        let name = if mesh_name.is_empty() {
            format!("mesh_{index}")
        } else {
            mesh_name.to_string()
        };
        let filename = format!("{name}_{timestamp}_{index}.{extension}");

        Self { name, filename }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Every collected mesh, whether or not it was written.
    pub attempted: usize,
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToExport,
    Finished(ExportReport),
}

impl ExportOutcome {
    pub fn attempted(&self) -> usize {
        match self {
            ExportOutcome::NothingToExport => 0,
            ExportOutcome::Finished(report) => report.attempted,
        }
    }

    /// The message shown to the user once the run is over.
    pub fn notice(&self) -> String {
        match self {
            ExportOutcome::NothingToExport => NOTHING_TO_EXPORT_NOTICE.to_string(),
            ExportOutcome::Finished(report) => format!("Downloaded {} meshes!", report.attempted),
        }
    }
}

type Clock = Box<dyn Fn() -> u128>;

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Counts and exports every mesh reachable from the registered scenes.
pub struct Exporter {
    registry: SharedRegistry,
    extension: String,
    clock: Clock,
}

impl Exporter {
    pub fn new(registry: SharedRegistry, extension: impl Into<String>) -> Self {
        Self {
            registry,
            extension: extension.into(),
            clock: Box::new(unix_millis),
        }
    }

    #[allow(dead_code)]
    pub fn with_clock(mut self, clock: impl Fn() -> u128 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn collect(&self) -> Vec<CollectedMesh> {
        let scenes = self.registry.borrow().snapshot();
        collect_all(&scenes)
    }

    pub fn count(&self) -> usize {
        self.collect().len()
    }

    /// Exports every collected mesh through `sink`. A mesh that cannot be
    /// serialized or written is logged and the run moves on.
    pub fn export_all(&self, sink: &mut dyn DownloadSink) -> ExportOutcome {
        let meshes = self.collect();

        if meshes.is_empty() {
            return ExportOutcome::NothingToExport;
        }

        log::info!("Downloading {} meshes...", meshes.len());

        let mut report = ExportReport {
            attempted: meshes.len(),
            ..Default::default()
        };

        for (index, mesh) in meshes.iter().enumerate() {
            let scene = mesh.scene.borrow();
            let mesh_name = scene
                .get_object(mesh.object_id)
                .map(|object| object.name.as_str())
                .unwrap_or_default();
            let record = MeshRecord::new(mesh_name, index, (self.clock)(), &self.extension);

            let Some(document) = mesh_to_obj(&record.name, scene.object_geometry(mesh.object_id))
            else {
                report.skipped.push(record.name);
                continue;
            };

            match sink.write(&document, &record.filename) {
                Ok(()) => report.written.push(record.filename),
                Err(err) => {
                    log::error!("Error exporting mesh {}: {:#}", record.name, err);
                    report.failed.push(record.name);
                }
            }
        }

        log::info!(
            "Export finished: {} written, {} skipped, {} failed",
            report.written.len(),
            report.skipped.len(),
            report.failed.len()
        );

        ExportOutcome::Finished(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SceneRegistry;
    use crate::scene_graph::object3d::Object3D;
    use crate::scene_graph::{BufferGeometry, Scene, SceneHandle};
    use anyhow::bail;
    use glam::Vec3;

    #[derive(Default)]
    struct RecordingSink {
        files: Vec<(String, String)>,
        fail_on: Option<String>,
    }

    impl DownloadSink for RecordingSink {
        fn write(&mut self, bytes: &[u8], suggested_filename: &str) -> anyhow::Result<()> {
            if self
                .fail_on
                .as_deref()
                .is_some_and(|name| suggested_filename.starts_with(name))
            {
                bail!("disk full");
            }

            let text = String::from_utf8(bytes.to_vec())?;
            self.files.push((suggested_filename.to_string(), text));
            Ok(())
        }
    }

    fn quad() -> BufferGeometry {
        BufferGeometry::indexed(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    fn exporter_with(scenes: &[&SceneHandle]) -> Exporter {
        let registry = SceneRegistry::shared();
        for scene in scenes {
            registry.borrow_mut().observe(scene);
        }
        Exporter::new(registry, "obj").with_clock(|| 1234)
    }

    fn count_lines(text: &str, prefix: &str) -> usize {
        text.lines().filter(|l| l.starts_with(prefix)).count()
    }

    #[test]
    fn record_falls_back_to_positional_name() {
        assert_eq!(
            MeshRecord::new("", 3, 99, "obj"),
            MeshRecord {
                name: "mesh_3".to_string(),
                filename: "mesh_3_99_3.obj".to_string(),
            }
        );
        assert_eq!(MeshRecord::new("Cube", 0, 99, "obj").filename, "Cube_99_0.obj");
    }

    #[test]
    fn empty_registry_exports_nothing() {
        let exporter = exporter_with(&[]);
        let mut sink = RecordingSink::default();

        let outcome = exporter.export_all(&mut sink);

        assert_eq!(outcome, ExportOutcome::NothingToExport);
        assert_eq!(outcome.notice(), NOTHING_TO_EXPORT_NOTICE);
        assert!(sink.files.is_empty());
    }

    #[test]
    fn null_geometry_mesh_is_not_collected() {
        let mut scene = Scene::new("page");
        let root = scene.root();
        scene.add_mesh(root, "valid", quad());
        scene.add_child(root, Object3D::mesh("broken", None));
        scene.add_child(root, Object3D::group("light"));
        let scene = scene.into_handle();
        let exporter = exporter_with(&[&scene]);
        let mut sink = RecordingSink::default();

        assert_eq!(exporter.count(), 1);
        let outcome = exporter.export_all(&mut sink);

        assert_eq!(outcome.attempted(), 1);
        assert_eq!(sink.files.len(), 1);
        let (filename, text) = &sink.files[0];
        assert_eq!(filename, "valid_1234_0.obj");
        assert_eq!(count_lines(text, "v "), 4);
        assert_eq!(count_lines(text, "f "), 2);
    }

    #[test]
    fn positionless_geometry_is_counted_but_skipped() {
        let mut scene = Scene::new("page");
        let root = scene.root();
        scene.add_mesh(root, "valid", quad());
        scene.add_mesh(root, "", BufferGeometry::default());
        scene.add_child(root, Object3D::group("light"));
        let scene = scene.into_handle();
        let exporter = exporter_with(&[&scene]);
        let mut sink = RecordingSink::default();

        assert_eq!(exporter.count(), 2);
        let outcome = exporter.export_all(&mut sink);

        let ExportOutcome::Finished(report) = &outcome else {
            panic!("expected a finished export");
        };
        assert_eq!(report.attempted, 2);
        assert_eq!(report.written, vec!["valid_1234_0.obj"]);
        assert_eq!(report.skipped, vec!["mesh_1"]);
        assert_eq!(outcome.notice(), "Downloaded 2 meshes!");
        assert_eq!(sink.files.len(), 1);
    }

    #[test]
    fn sink_failure_does_not_abort_batch() {
        let mut scene = Scene::new("page");
        let root = scene.root();
        scene.add_mesh(root, "first", quad());
        scene.add_mesh(root, "second", quad());
        scene.add_mesh(root, "third", quad());
        let scene = scene.into_handle();
        let exporter = exporter_with(&[&scene]);
        let mut sink = RecordingSink {
            fail_on: Some("second".to_string()),
            ..Default::default()
        };

        let ExportOutcome::Finished(report) = exporter.export_all(&mut sink) else {
            panic!("expected a finished export");
        };

        assert_eq!(report.attempted, 3);
        assert_eq!(report.failed, vec!["second"]);
        assert_eq!(report.written, vec!["first_1234_0.obj", "third_1234_2.obj"]);
    }

    #[test]
    fn indices_run_across_scenes() {
        let mut first = Scene::new("first");
        first.add_mesh(first.root(), "a", quad());
        let mut second = Scene::new("second");
        second.add_mesh(second.root(), "b", quad());
        let (first, second) = (first.into_handle(), second.into_handle());
        let exporter = exporter_with(&[&first, &second]);
        let mut sink = RecordingSink::default();

        exporter.export_all(&mut sink);

        let names = sink.files.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a_1234_0.obj", "b_1234_1.obj"]);
    }

    #[test]
    fn count_is_stable_and_tracks_scene_changes() {
        let mut scene = Scene::new("page");
        scene.add_mesh(scene.root(), "a", quad());
        let scene = scene.into_handle();
        let exporter = exporter_with(&[&scene]);

        assert_eq!(exporter.count(), 1);
        assert_eq!(exporter.count(), 1);

        {
            let mut scene = scene.borrow_mut();
            let root = scene.root();
            scene.add_mesh(root, "b", quad());
        }

        assert_eq!(exporter.count(), 2);
    }
}
