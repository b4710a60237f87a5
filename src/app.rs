//! Headless frame loop tying the hierarchy, the loader and the controller together.

use crate::config::{AppConfig, Config};
use crate::hierarchy::Hierarchy;
use crate::scene::{SceneLibrary, SceneTransitionController, TransitionHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// A minimal engine: one hierarchy, one scene library, one controller.
///
/// Each [`step`](Self::step) runs a frame in engine order:
///
/// 1. pending scene loads advance and due scenes are built,
/// 2. the controller drives its transition,
/// 3. nodes destroyed during the frame are removed,
/// 4. the clock advances by one frame.
///
/// # Example
///
/// ```
/// use scenehop::*;
///
/// let mut library = SceneLibrary::new();
/// library.register("Title", |hierarchy| {
///     hierarchy.spawn("Title", None);
/// });
///
/// let config = Config {
///     controller: ControllerConfig::new().default_scene("Title"),
///     ..Default::default()
/// };
/// let mut app = App::new(config, library);
/// let handle = app.start().unwrap();
///
/// app.run_until(10, |app| app.controller.can_change());
/// assert!(handle.is_finished());
/// ```
pub struct App {
    pub hierarchy: Hierarchy,
    pub library: Rc<RefCell<SceneLibrary>>,
    pub controller: SceneTransitionController,
    config: AppConfig,
    time: f32,
    frame: u64,
}

impl App {
    /// Build the app and spawn the controller's node.
    pub fn new(config: Config, library: SceneLibrary) -> Self {
        let mut hierarchy = Hierarchy::new();
        let library = Rc::new(RefCell::new(library));
        let controller =
            SceneTransitionController::new(&mut hierarchy, library.clone(), config.controller);

        Self {
            hierarchy,
            library,
            controller,
            config: config.app,
            time: 0.0,
            frame: 0,
        }
    }

    /// Load `scene` right away, as if the app had been launched inside it.
    pub fn boot_into(&mut self, scene: &str) -> Result<(), crate::error::LoadError> {
        self.library.borrow_mut().instantiate(&mut self.hierarchy, scene)
    }

    /// Request the controller's default scene.
    pub fn start(&mut self) -> Option<TransitionHandle> {
        self.controller.start(&mut self.hierarchy)
    }

    /// Request a transition carrying `parameter`.
    pub fn change_scene<T: 'static>(
        &mut self,
        scene: &str,
        parameter: T,
    ) -> Option<TransitionHandle> {
        self.controller
            .request_change(&mut self.hierarchy, Some(scene), parameter)
    }

    /// Run a single frame.
    pub fn step(&mut self) {
        let loaded = self.library.borrow_mut().pump(&mut self.hierarchy);
        if !loaded.is_empty() {
            log::trace!("Frame {}: loaded {:?}", self.frame, loaded);
        }

        self.controller.update(&mut self.hierarchy, self.time);

        let removed = self.hierarchy.flush_destroyed();
        if removed > 0 {
            log::trace!("Frame {}: removed {} nodes", self.frame, removed);
        }

        self.time += self.config.frame_time();
        self.frame += 1;
    }

    /// Step until `done` returns true or `max_frames` frames have run.
    ///
    /// Returns the number of frames stepped.
    pub fn run_until<F>(&mut self, max_frames: u64, mut done: F) -> u64
    where
        F: FnMut(&App) -> bool,
    {
        let mut frames = 0;
        while frames < max_frames && !done(self) {
            self.step();
            frames += 1;
        }
        frames
    }

    /// Step until the given transition finishes, bounded by the configured frame limit.
    pub fn wait_for(&mut self, handle: &TransitionHandle) -> u64 {
        let limit = self.config.max_frames;
        self.run_until(limit, |_| handle.is_finished())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Seconds simulated so far.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
