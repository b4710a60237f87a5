//! Controller that swaps the active scene using additive loads.

use super::init::initialize_scene;
use super::loader::SharedLoader;
use super::scene::SceneId;
use super::transition::{
    ActiveTransition, InitializeFn, TransitionEvent, TransitionHandle, TransitionPhase,
};
use crate::config::ControllerConfig;
use crate::error::TransitionError;
use crate::hierarchy::{Hierarchy, find_root};
use hecs::Entity;

/// Moves the application from one scene to the next.
///
/// The controller owns a node in the hierarchy. The active scene's root is
/// kept as a child of that node. A transition:
///
/// 1. marks the controller busy, remembers the outgoing scene, detaches the
///    controller's children, and requests an additive load;
/// 2. waits, one [`update`](Self::update) per frame, until a node named after
///    the scene appears (bounded by [`ControllerConfig::load_timeout`]);
/// 3. moves that node under the controller and destroys the wrapper root it
///    arrived in, if any;
/// 4. runs the node's initializers for the request's parameter type;
/// 5. destroys the previous scene's root and goes idle again.
///
/// Only one transition runs at a time. Requests made while busy are dropped.
///
/// # Example
///
/// ```
/// use scenehop::{ControllerConfig, Hierarchy, SceneLibrary, SceneTransitionController};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let mut library = SceneLibrary::new();
/// library.register("Level1", |hierarchy| {
///     hierarchy.spawn("Level1", None);
/// });
/// let library = Rc::new(RefCell::new(library));
///
/// let mut hierarchy = Hierarchy::new();
/// let mut controller =
///     SceneTransitionController::new(&mut hierarchy, library.clone(), ControllerConfig::new());
///
/// let handle = controller.change_scene(&mut hierarchy, "Level1").unwrap();
/// library.borrow_mut().pump(&mut hierarchy);
/// controller.update(&mut hierarchy, 0.0);
///
/// assert!(handle.is_finished());
/// assert_eq!(hierarchy.children(controller.node()), hierarchy.find_all("Level1"));
/// ```
pub struct SceneTransitionController {
    /// Node that parents the active scene.
    node: Entity,

    /// Engine loader, also the source of the current scene name.
    loader: SharedLoader,

    config: ControllerConfig,

    /// Scene whose root is evicted by the next transition.
    previous: Option<SceneId>,

    /// False while a transition is in flight.
    can_change: bool,

    transition: Option<ActiveTransition>,

    listeners: Vec<Box<dyn FnMut(&TransitionEvent)>>,
}

impl SceneTransitionController {
    /// Create a controller and spawn its node (named by `config.node_name`).
    pub fn new(hierarchy: &mut Hierarchy, loader: SharedLoader, config: ControllerConfig) -> Self {
        let node = hierarchy.spawn(config.node_name.clone(), None);

        Self {
            node,
            loader,
            config,
            previous: None,
            can_change: true,
            transition: None,
            listeners: Vec::new(),
        }
    }

    /// The controller's own node.
    pub fn node(&self) -> Entity {
        self.node
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// True when no transition is in flight.
    pub fn can_change(&self) -> bool {
        self.can_change
    }

    /// Phase of the in-flight transition, if any.
    pub fn phase(&self) -> Option<TransitionPhase> {
        self.transition.as_ref().and_then(|active| active.handle.phase())
    }

    /// Scene that the next transition will evict.
    pub fn previous_scene(&self) -> Option<&SceneId> {
        self.previous.as_ref()
    }

    /// Name of the scene the loader reports as loaded.
    pub fn current_scene_name(&self) -> Option<String> {
        self.loader.borrow().current_scene()
    }

    /// Register a listener for transition events.
    pub fn on_event<F: FnMut(&TransitionEvent) + 'static>(&mut self, listener: F) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Request the configured default scene.
    ///
    /// With no default scene configured this is an empty transition.
    pub fn start(&mut self, hierarchy: &mut Hierarchy) -> Option<TransitionHandle> {
        let scene = self.config.default_scene.clone();
        log::info!("Starting with default scene {:?}", scene);
        self.request_change(hierarchy, scene.as_deref(), ())
    }

    /// Request a transition that carries no parameter.
    pub fn change_scene(
        &mut self,
        hierarchy: &mut Hierarchy,
        scene: &str,
    ) -> Option<TransitionHandle> {
        self.request_change(hierarchy, Some(scene), ())
    }

    /// Request a transition to `scene`, passing `parameter` to its initializers.
    ///
    /// Returns `None` without side effects when a transition is already in
    /// flight. A `None` scene is an empty transition: the returned handle is
    /// already complete and nothing changes. A scene the loader does not know
    /// yields a handle that has already failed with
    /// [`TransitionError::SceneNotFound`].
    pub fn request_change<T: 'static>(
        &mut self,
        hierarchy: &mut Hierarchy,
        scene: Option<&str>,
        parameter: T,
    ) -> Option<TransitionHandle> {
        if !self.can_change {
            log::debug!("Ignoring transition to {:?}: another transition is in flight", scene);
            return None;
        }

        let Some(scene) = scene else {
            return Some(TransitionHandle::completed(None));
        };
        let scene = SceneId::new(scene);

        let requested = self.loader.borrow_mut().load_additive(scene.as_str());
        if let Err(error) = requested {
            log::warn!("Cannot change to scene '{}': {}", scene, error);
            let error = TransitionError::SceneNotFound(scene.clone());
            self.emit(&TransitionEvent::Failed {
                scene: scene.clone(),
                error: error.clone(),
            });
            return Some(TransitionHandle::failed(scene, error));
        }

        if self.previous.is_none() {
            self.previous = self.current_scene_name().map(SceneId::from);
        }
        self.can_change = false;

        let outgoing = self
            .previous
            .as_ref()
            .and_then(|previous| hierarchy.find(previous.as_str()))
            .filter(|node| *node != self.node);

        let detached = hierarchy.children(self.node);
        if let Err(error) = hierarchy.detach_children(self.node) {
            log::warn!("Failed to detach scene controller children: {}", error);
        }

        // Transition-out effects would start here.

        let handle = TransitionHandle::pending(scene.clone());
        let initialize: InitializeFn =
            Box::new(move |hierarchy, node| initialize_scene(hierarchy, node, &parameter));
        self.transition = Some(ActiveTransition::new(
            scene.clone(),
            handle.clone(),
            outgoing,
            detached,
            initialize,
        ));

        log::info!(
            "Changing scene: {} -> {}",
            self.previous.as_ref().map(SceneId::as_str).unwrap_or("<none>"),
            scene
        );
        self.emit(&TransitionEvent::Started { scene });
        Some(handle)
    }

    /// Drive the in-flight transition by one frame.
    ///
    /// `time` is the frame clock in seconds; the load timeout is measured from
    /// the first update after the request. Returns true when a transition
    /// finished (successfully or not) during this call.
    pub fn update(&mut self, hierarchy: &mut Hierarchy, time: f32) -> bool {
        let Some(active) = self.transition.as_mut() else {
            return false;
        };

        if active.handle.cancel_requested() {
            let error = TransitionError::Cancelled(active.scene.clone());
            self.abort(hierarchy, error);
            return true;
        }

        let waited = active.elapsed(time);
        let incoming = hierarchy
            .find_all(active.scene.as_str())
            .into_iter()
            .find(|node| Some(*node) != active.outgoing && *node != self.node);

        let Some(incoming) = incoming else {
            active.frames_waited += 1;

            if let Some(limit) = self.config.load_timeout {
                if waited >= limit {
                    let error = TransitionError::LoadTimeout {
                        scene: active.scene.clone(),
                        waited,
                        frames: active.frames_waited,
                    };
                    self.abort(hierarchy, error);
                    return true;
                }
            }
            return false;
        };

        if let Some(transition) = self.transition.take() {
            log::debug!(
                "Scene '{}' appeared after {} frames",
                transition.scene,
                transition.frames_waited
            );
            self.complete(hierarchy, transition, incoming);
        }
        true
    }

    fn complete(
        &mut self,
        hierarchy: &mut Hierarchy,
        mut transition: ActiveTransition,
        incoming: Entity,
    ) {
        let initialized = match self.attach(hierarchy, &mut transition, incoming) {
            Ok(initialized) => initialized,
            Err(error) => {
                self.fail(hierarchy, transition, error);
                return;
            }
        };

        self.enter_phase(&transition, TransitionPhase::Evicting);
        self.evict(hierarchy, incoming);

        let scene = transition.scene.clone();
        self.previous = Some(scene.clone());
        self.can_change = true;

        // Transition-in effects would start here.

        log::info!("Scene '{}' ready ({} initializers)", scene, initialized);
        transition.handle.finish(Ok(()));
        self.emit(&TransitionEvent::Completed { scene, initialized });
    }

    fn attach(
        &mut self,
        hierarchy: &mut Hierarchy,
        transition: &mut ActiveTransition,
        incoming: Entity,
    ) -> Result<usize, TransitionError> {
        self.enter_phase(transition, TransitionPhase::Attaching);

        let loaded_root = find_root(hierarchy, incoming);
        hierarchy.set_parent(incoming, Some(self.node))?;

        if loaded_root != incoming {
            log::debug!(
                "Discarding wrapper root '{}' around scene '{}'",
                hierarchy.name(loaded_root).unwrap_or_default(),
                transition.scene
            );
            hierarchy.destroy(loaded_root);
        }

        self.enter_phase(transition, TransitionPhase::Initializing);
        let initialized = transition
            .initialize
            .take()
            .map(|initialize| initialize(hierarchy, incoming))
            .unwrap_or(0);

        Ok(initialized)
    }

    fn evict(&mut self, hierarchy: &mut Hierarchy, incoming: Entity) {
        let Some(previous) = self.previous.as_ref() else {
            return;
        };

        let stale = hierarchy
            .find_all(previous.as_str())
            .into_iter()
            .find(|node| *node != incoming && *node != self.node);

        if let Some(stale) = stale {
            log::debug!("Evicting previous scene '{}'", previous);
            hierarchy.destroy(stale);
        }
    }

    /// Stop the in-flight transition before anything was attached.
    fn abort(&mut self, hierarchy: &mut Hierarchy, error: TransitionError) {
        let Some(transition) = self.transition.take() else {
            return;
        };

        self.loader.borrow_mut().abort(transition.scene.as_str());
        self.discard_arrived(hierarchy, &transition);
        self.fail(hierarchy, transition, error);
    }

    /// Destroy copies of the scene that arrived but were never attached,
    /// together with any wrapper root they came in.
    fn discard_arrived(&self, hierarchy: &mut Hierarchy, transition: &ActiveTransition) {
        let arrived: Vec<Entity> = hierarchy
            .find_all(transition.scene.as_str())
            .into_iter()
            .filter(|node| Some(*node) != transition.outgoing && *node != self.node)
            .collect();
        let own_root = find_root(hierarchy, self.node);

        for node in arrived {
            let root = find_root(hierarchy, node);
            if root == own_root
                || Some(root) == transition.outgoing
                || transition.detached.contains(&root)
            {
                continue;
            }
            log::debug!("Discarding unattached copy of scene '{}'", transition.scene);
            hierarchy.destroy(root);
        }
    }

    fn fail(
        &mut self,
        hierarchy: &mut Hierarchy,
        transition: ActiveTransition,
        error: TransitionError,
    ) {
        log::warn!("Transition to '{}' failed: {}", transition.scene, error);

        // Put the outgoing scene back where it was.
        for node in transition.detached {
            if hierarchy.contains(node)
                && !hierarchy.is_destroyed(node)
                && hierarchy.parent(node).is_none()
            {
                if let Err(error) = hierarchy.set_parent(node, Some(self.node)) {
                    log::warn!("Failed to restore detached node: {}", error);
                }
            }
        }

        self.can_change = true;
        transition.handle.finish(Err(error.clone()));
        self.emit(&TransitionEvent::Failed {
            scene: transition.scene,
            error,
        });
    }

    fn enter_phase(&mut self, transition: &ActiveTransition, phase: TransitionPhase) {
        log::debug!("Transition to '{}': {:?}", transition.scene, phase);
        transition.handle.set_phase(phase);
        self.emit(&TransitionEvent::PhaseChanged {
            scene: transition.scene.clone(),
            phase,
        });
    }

    fn emit(&mut self, event: &TransitionEvent) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
