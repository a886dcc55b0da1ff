use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::scene_graph::{Scene, SceneHandle};

pub type SharedRegistry = Rc<RefCell<SceneRegistry>>;

/// Something the host made observable. Renderers are announced on the same
/// hook as scenes but are of no interest here.
pub enum ObservedObject {
    Scene(SceneHandle),
    /// Announced by hosts that also expose their renderer; always ignored.
    #[allow(dead_code)]
    Renderer,
}

pub enum DevtoolsEvent {
    /// Sent once by the host before any scene, naming its library version.
    Register { revision: String },
    Observe(ObservedObject),
}

type Listener = Box<dyn FnMut(&DevtoolsEvent)>;

/// Event target the host dispatches to when it creates scenes.
#[derive(Default)]
pub struct DevtoolsHook {
    listeners: Vec<Listener>,
}

impl DevtoolsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&DevtoolsEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Calls `callback` for every observed scene and nothing else.
    pub fn on_scene_observed(&mut self, mut callback: impl FnMut(&SceneHandle) + 'static) {
        self.add_listener(move |event| {
            if let DevtoolsEvent::Observe(ObservedObject::Scene(scene)) = event {
                callback(scene);
            }
        });
    }

    pub fn dispatch(&mut self, event: DevtoolsEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

/// Scenes announced by the host, in announcement order.
///
/// Only weak references are held: a scene the host drops disappears from
/// snapshots but its slot is never reused, so the list only grows.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: Vec<Weak<RefCell<Scene>>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Registers `registry` as an observer on `hook`.
    pub fn attach(registry: &SharedRegistry, hook: &mut DevtoolsHook) {
        let registry = Rc::clone(registry);
        hook.on_scene_observed(move |scene| {
            registry.borrow_mut().observe(scene);
        });
    }

    /// Returns false if the scene was already known.
    pub fn observe(&mut self, scene: &SceneHandle) -> bool {
        let weak = Rc::downgrade(scene);
        if self.scenes.iter().any(|known| known.ptr_eq(&weak)) {
            return false;
        }

        self.scenes.push(weak);
        log::info!("Scene captured: {:?}", scene.borrow().name);
        true
    }

    /// Live scenes, in the order they were observed.
    pub fn snapshot(&self) -> Vec<SceneHandle> {
        self.scenes.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
