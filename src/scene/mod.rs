//! Scene transitions.
//!
//! A scene is a named subtree that the engine loads additively into the
//! [`Hierarchy`](crate::Hierarchy). The [`SceneTransitionController`] keeps
//! exactly one scene attached under its own node and swaps it for another on
//! request.
//!
//! # Overview
//!
//! - [`SceneLoader`] is the engine boundary: it starts additive loads and
//!   reports the current scene name. [`SceneLibrary`] implements it with
//!   closures that build each scene.
//! - [`SceneInit`] implementations attached to a scene's root receive the
//!   parameter passed with the transition request.
//! - [`TransitionHandle`] reports progress and can be awaited or cancelled.
//!
//! # Example
//!
//! ```
//! use scenehop::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut library = SceneLibrary::new().with_latency(2);
//! library.register("Level1", |hierarchy| {
//!     hierarchy.spawn("Level1", None);
//! });
//! library.register("Level2", |hierarchy| {
//!     let root = hierarchy.spawn("Level2", None);
//!     hierarchy
//!         .add_initializer::<u32, _>(root, |lives: &u32| println!("starting with {lives} lives"))
//!         .unwrap();
//! });
//! let library = Rc::new(RefCell::new(library));
//!
//! let mut hierarchy = Hierarchy::new();
//! let mut controller = SceneTransitionController::new(
//!     &mut hierarchy,
//!     library.clone(),
//!     ControllerConfig::new().default_scene("Level1"),
//! );
//!
//! controller.start(&mut hierarchy);
//! let mut time = 0.0;
//! while !controller.can_change() {
//!     library.borrow_mut().pump(&mut hierarchy);
//!     controller.update(&mut hierarchy, time);
//!     hierarchy.flush_destroyed();
//!     time += 1.0 / 60.0;
//! }
//!
//! let handle = controller.request_change(&mut hierarchy, Some("Level2"), 3u32).unwrap();
//! while !handle.is_finished() {
//!     library.borrow_mut().pump(&mut hierarchy);
//!     controller.update(&mut hierarchy, time);
//!     hierarchy.flush_destroyed();
//!     time += 1.0 / 60.0;
//! }
//!
//! assert!(hierarchy.find("Level1").is_none());
//! assert_eq!(controller.current_scene_name().as_deref(), Some("Level2"));
//! ```

mod controller;
mod init;
mod loader;
pub mod scene;
mod transition;

pub use controller::SceneTransitionController;
pub use init::{Initializers, SceneInit};
pub use loader::{SceneLibrary, SceneLoader, SharedLoader};
pub use scene::SceneId;
pub use transition::{TransitionEvent, TransitionHandle, TransitionPhase, TransitionStatus};
