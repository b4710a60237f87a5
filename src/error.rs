//! Error types for the hierarchy, the scene loader, and transitions.

use crate::scene::SceneId;
use hecs::Entity;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by structural edits to the [`Hierarchy`](crate::Hierarchy).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HierarchyError {
    /// The node was never spawned or has already been despawned.
    #[error("node {0:?} does not exist")]
    NoSuchNode(Entity),
    /// The requested parent is the node itself or one of its descendants.
    #[error("cannot parent {child:?} under its own descendant {parent:?}")]
    Cycle { child: Entity, parent: Entity },
}

/// Errors reported synchronously by a [`SceneLoader`](crate::scene::SceneLoader).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The loader has no scene by this name.
    #[error("no scene named '{0}' is registered")]
    UnknownScene(String),
}

/// Reasons a scene transition did not complete.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The loader rejected the scene name.
    #[error("scene '{0}' could not be loaded")]
    SceneNotFound(SceneId),
    /// No node named after the scene appeared before the load timeout.
    #[error("scene '{scene}' did not appear within {waited:.2}s ({frames} frames)")]
    LoadTimeout {
        scene: SceneId,
        waited: f32,
        frames: u32,
    },
    /// The caller cancelled the transition while it was still loading.
    #[error("transition to '{0}' was cancelled")]
    Cancelled(SceneId),
    /// Attaching the loaded scene failed.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Errors raised while reading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config syntax error: {0}")]
    Parse(#[from] toml::de::Error),
}
