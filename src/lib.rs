//! # scenehop
//!
//! **Additive scene transitions for a frame-driven engine.**
//!
//! Scenes are named subtrees of a [`Hierarchy`] (backed by `hecs`). The
//! [`SceneTransitionController`] loads the next scene additively, waits for its
//! root node to appear, moves it under the controller, hands it a typed
//! parameter, and destroys the previous scene.
//!
//! ## Quick Start
//!
//! ```
//! use scenehop::*;
//!
//! let mut library = SceneLibrary::new().with_latency(3);
//! library.register("Level1", |hierarchy| {
//!     hierarchy.spawn("Level1", None);
//! });
//! library.register("Level2", |hierarchy| {
//!     // Content may arrive inside an extra container node; the controller discards it.
//!     let wrapper = hierarchy.spawn("Loader", None);
//!     let root = hierarchy.spawn("Level2", Some(wrapper));
//!     hierarchy
//!         .add_initializer::<i32, _>(root, |seed: &i32| println!("Level2 seeded with {seed}"))
//!         .unwrap();
//! });
//!
//! let mut app = App::new(Config::default(), library);
//! app.boot_into("Level1").unwrap();
//!
//! let handle = app.change_scene("Level2", 42).unwrap();
//! app.wait_for(&handle);
//!
//! assert_eq!(handle.status(), TransitionStatus::Completed);
//! assert!(app.hierarchy.find("Level1").is_none());
//! assert!(app.hierarchy.find("Loader").is_none());
//! ```
//!
//! ## Guarantees
//!
//! - One transition at a time: requests made while busy return `None`.
//! - The previous scene is destroyed only after the new one is attached.
//! - Waiting is bounded by a configurable timeout and can be cancelled.

mod app;
mod config;
mod error;
pub mod hierarchy;
pub mod scene;
mod transform;

pub use app::App;
pub use config::{AppConfig, Config, ControllerConfig};
pub use error::{ConfigError, HierarchyError, LoadError, TransitionError};
pub use hierarchy::{Children, Hierarchy, Name, Parent, find_root};
pub use scene::{
    Initializers, SceneId, SceneInit, SceneLibrary, SceneLoader, SceneTransitionController,
    SharedLoader, TransitionEvent, TransitionHandle, TransitionPhase, TransitionStatus,
};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3};

// ECS handles
pub use hecs::{Entity, World};
