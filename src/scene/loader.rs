//! The scene loader boundary and an in-process implementation.

use crate::error::LoadError;
use crate::hierarchy::Hierarchy;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Engine-side scene loading as seen by the transition controller.
///
/// Loads are additive and fire-and-forget: the loader populates the
/// hierarchy on its own schedule, and the controller watches for the scene's
/// root node by name.
pub trait SceneLoader {
    /// Start loading `scene` without unloading anything already present.
    ///
    /// Fails only when the loader knows up front that it cannot produce the
    /// scene.
    fn load_additive(&mut self, scene: &str) -> Result<(), LoadError>;

    /// Drop a pending load of `scene`, if the loader supports it.
    fn abort(&mut self, _scene: &str) {}

    /// Name of the most recently loaded scene.
    fn current_scene(&self) -> Option<String>;
}

/// Loader handle shared between the controller and the frame loop.
pub type SharedLoader = Rc<RefCell<dyn SceneLoader>>;

type BuildFn = Box<dyn Fn(&mut Hierarchy)>;

struct Blueprint {
    build: BuildFn,
    latency: Option<u32>,
}

struct PendingLoad {
    scene: String,
    frames_left: u32,
}

/// Loader that builds registered scenes from closures.
///
/// Each blueprint spawns the scene's nodes into the hierarchy. A load stays
/// pending for `latency` frames and its content appears on the following
/// [`pump`](Self::pump).
///
/// # Example
///
/// ```
/// use scenehop::{Hierarchy, SceneLibrary, SceneLoader};
///
/// let mut library = SceneLibrary::new().with_latency(1);
/// library.register("Level1", |hierarchy| {
///     let root = hierarchy.spawn("Level1", None);
///     hierarchy.spawn("Player", Some(root));
/// });
///
/// let mut hierarchy = Hierarchy::new();
/// library.load_additive("Level1").unwrap();
/// assert!(library.pump(&mut hierarchy).is_empty());
/// assert_eq!(library.pump(&mut hierarchy), vec!["Level1".to_string()]);
/// assert!(hierarchy.find("Player").is_some());
/// ```
pub struct SceneLibrary {
    blueprints: HashMap<String, Blueprint>,
    pending: Vec<PendingLoad>,
    current: Option<String>,
    latency: u32,
}

impl SceneLibrary {
    /// Create an empty library whose loads complete on the next pump.
    pub fn new() -> Self {
        Self {
            blueprints: HashMap::new(),
            pending: Vec::new(),
            current: None,
            latency: 0,
        }
    }

    /// Set the default number of frames a load stays pending.
    pub fn with_latency(mut self, frames: u32) -> Self {
        self.latency = frames;
        self
    }

    /// Register a scene using the library's default latency.
    pub fn register<F>(&mut self, scene: impl Into<String>, build: F) -> &mut Self
    where
        F: Fn(&mut Hierarchy) + 'static,
    {
        self.insert(scene.into(), Box::new(build), None)
    }

    /// Register a scene that takes `frames` frames to load.
    pub fn register_with_latency<F>(
        &mut self,
        scene: impl Into<String>,
        frames: u32,
        build: F,
    ) -> &mut Self
    where
        F: Fn(&mut Hierarchy) + 'static,
    {
        self.insert(scene.into(), Box::new(build), Some(frames))
    }

    fn insert(&mut self, scene: String, build: BuildFn, latency: Option<u32>) -> &mut Self {
        if self.blueprints.insert(scene.clone(), Blueprint { build, latency }).is_some() {
            log::warn!("Scene '{}' registered twice, keeping the latest", scene);
        }
        self
    }

    pub fn contains(&self, scene: &str) -> bool {
        self.blueprints.contains_key(scene)
    }

    /// Returns true while a load of `scene` is pending.
    pub fn is_loading(&self, scene: &str) -> bool {
        self.pending.iter().any(|load| load.scene == scene)
    }

    /// Build `scene` immediately and mark it as the current scene.
    ///
    /// Used to put an app into a scene before the controller takes over.
    pub fn instantiate(&mut self, hierarchy: &mut Hierarchy, scene: &str) -> Result<(), LoadError> {
        if !self.contains(scene) {
            return Err(LoadError::UnknownScene(scene.to_string()));
        }
        self.build(hierarchy, scene);
        Ok(())
    }

    /// Advance pending loads by one frame, building the ones that are due.
    ///
    /// Returns the scenes whose content was added this frame.
    pub fn pump(&mut self, hierarchy: &mut Hierarchy) -> Vec<String> {
        let mut due = Vec::new();
        let mut waiting = Vec::new();

        for mut load in std::mem::take(&mut self.pending) {
            if load.frames_left == 0 {
                due.push(load.scene);
            } else {
                load.frames_left -= 1;
                waiting.push(load);
            }
        }
        self.pending = waiting;

        for scene in &due {
            self.build(hierarchy, scene);
        }
        due
    }

    fn build(&mut self, hierarchy: &mut Hierarchy, scene: &str) {
        if let Some(blueprint) = self.blueprints.get(scene) {
            (blueprint.build)(hierarchy);
            self.current = Some(scene.to_string());
            log::info!("Loaded scene '{}'", scene);
        }
    }
}

impl Default for SceneLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLoader for SceneLibrary {
    fn load_additive(&mut self, scene: &str) -> Result<(), LoadError> {
        let Some(blueprint) = self.blueprints.get(scene) else {
            return Err(LoadError::UnknownScene(scene.to_string()));
        };

        let frames_left = blueprint.latency.unwrap_or(self.latency);
        log::debug!("Queued additive load of '{}' ({} frames)", scene, frames_left);
        self.pending.push(PendingLoad {
            scene: scene.to_string(),
            frames_left,
        });
        Ok(())
    }

    fn abort(&mut self, scene: &str) {
        let before = self.pending.len();
        self.pending.retain(|load| load.scene != scene);
        if self.pending.len() != before {
            log::debug!("Aborted pending load of '{}'", scene);
        }
    }

    fn current_scene(&self) -> Option<String> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> SceneLibrary {
        let mut library = SceneLibrary::new().with_latency(2);
        library.register("Level1", |hierarchy| {
            hierarchy.spawn("Level1", None);
        });
        library.register_with_latency("Title", 0, |hierarchy| {
            hierarchy.spawn("Title", None);
        });
        library
    }

    #[test]
    fn unknown_scene_is_rejected() {
        let mut library = library();
        assert_eq!(
            library.load_additive("Nowhere"),
            Err(LoadError::UnknownScene("Nowhere".to_string()))
        );
        assert!(!library.is_loading("Nowhere"));
    }

    #[test]
    fn load_waits_for_latency() {
        let mut library = library();
        let mut hierarchy = Hierarchy::new();

        library.load_additive("Level1").unwrap();
        assert!(library.pump(&mut hierarchy).is_empty());
        assert!(library.pump(&mut hierarchy).is_empty());
        assert!(hierarchy.find("Level1").is_none());
        assert_eq!(library.current_scene(), None);

        assert_eq!(library.pump(&mut hierarchy), vec!["Level1".to_string()]);
        assert!(hierarchy.find("Level1").is_some());
        assert_eq!(library.current_scene(), Some("Level1".to_string()));
        assert!(!library.is_loading("Level1"));
    }

    #[test]
    fn per_scene_latency_overrides_default() {
        let mut library = library();
        let mut hierarchy = Hierarchy::new();

        library.load_additive("Title").unwrap();
        assert_eq!(library.pump(&mut hierarchy), vec!["Title".to_string()]);
    }

    #[test]
    fn abort_drops_pending_load() {
        let mut library = library();
        let mut hierarchy = Hierarchy::new();

        library.load_additive("Level1").unwrap();
        library.abort("Level1");

        for _ in 0..4 {
            library.pump(&mut hierarchy);
        }
        assert!(hierarchy.is_empty());
    }

    #[test]
    fn instantiate_builds_immediately() {
        let mut library = library();
        let mut hierarchy = Hierarchy::new();

        library.instantiate(&mut hierarchy, "Level1").unwrap();
        assert!(hierarchy.find("Level1").is_some());
        assert_eq!(library.current_scene(), Some("Level1".to_string()));
        assert!(library.instantiate(&mut hierarchy, "Nowhere").is_err());
    }
}
