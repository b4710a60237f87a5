//! Scene hierarchy stored in a `hecs` world.
//!
//! Every node is an entity with a [`Name`], a local [`Transform`], and a
//! [`Children`] list. Non-root nodes also carry a [`Parent`]. Scenes are
//! located by name at the moment they are needed rather than by stored
//! handle, since a node may still be loading or may already be gone.
//!
//! Destruction follows the usual engine convention: [`Hierarchy::destroy`]
//! only schedules a node, and the subtree is removed when the frame loop calls
//! [`Hierarchy::flush_destroyed`].
//!
//! # Example
//!
//! ```
//! use scenehop::Hierarchy;
//!
//! let mut hierarchy = Hierarchy::new();
//! let level = hierarchy.spawn("Level1", None);
//! let player = hierarchy.spawn("Player", Some(level));
//!
//! assert_eq!(hierarchy.find("Player"), Some(player));
//!
//! hierarchy.destroy(level);
//! assert_eq!(hierarchy.flush_destroyed(), 2);
//! assert!(hierarchy.find("Player").is_none());
//! ```

mod node;
mod root;

pub use node::{Children, Name, Parent};
pub use root::find_root;

use crate::error::HierarchyError;
use crate::transform::Transform;
use glam::Mat4;
use hecs::{Entity, World};
use node::PendingDestroy;
use std::fmt;

/// Tree of named nodes backed by a `hecs::World`.
pub struct Hierarchy {
    world: World,
    /// Nodes scheduled by `destroy`, in request order.
    doomed: Vec<Entity>,
}

impl Hierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self {
            world: World::new(),
            doomed: Vec::new(),
        }
    }

    /// The underlying ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the underlying ECS world.
    ///
    /// Adding or removing [`Parent`] and [`Children`] components directly
    /// bypasses the hierarchy's bookkeeping; use [`Self::set_parent`] instead.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Number of live entities, including ones scheduled for destruction.
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    // ========================================================================
    // Spawning and queries
    // ========================================================================

    /// Spawn a node with an identity transform.
    pub fn spawn(&mut self, name: impl Into<String>, parent: Option<Entity>) -> Entity {
        self.spawn_with(name, parent, Transform::default())
    }

    /// Spawn a node with the given local transform.
    ///
    /// A parent that no longer exists is ignored and the node becomes a root.
    pub fn spawn_with(
        &mut self,
        name: impl Into<String>,
        parent: Option<Entity>,
        transform: Transform,
    ) -> Entity {
        let name = name.into();
        let entity = self
            .world
            .spawn((Name(name.clone()), transform, Children::default()));

        if let Some(parent) = parent {
            if self.contains(parent) {
                self.link(entity, parent);
            } else {
                log::warn!(
                    "Parent {:?} for node '{}' does not exist, spawning as root",
                    parent,
                    name
                );
            }
        }

        entity
    }

    /// Returns true if the node exists (even if it is scheduled for destruction).
    pub fn contains(&self, node: Entity) -> bool {
        self.world.contains(node)
    }

    /// Returns true if the node has been scheduled for destruction this frame.
    pub fn is_destroyed(&self, node: Entity) -> bool {
        self.world.get::<&PendingDestroy>(node).is_ok()
    }

    /// Find the first live node with the given name.
    ///
    /// Nodes scheduled for destruction are never returned.
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.find_all(name).into_iter().next()
    }

    /// Find every live node with the given name, oldest entity id first.
    pub fn find_all(&self, name: &str) -> Vec<Entity> {
        let mut found: Vec<Entity> = self
            .world
            .query::<&Name>()
            .iter()
            .filter(|(_, node_name)| node_name.0 == name)
            .map(|(entity, _)| entity)
            .collect();

        found.retain(|entity| !self.is_destroyed(*entity));
        found.sort();
        found
    }

    /// The node's name.
    pub fn name(&self, node: Entity) -> Option<String> {
        self.world.get::<&Name>(node).ok().map(|name| name.0.clone())
    }

    /// The node's parent, or `None` for roots and missing nodes.
    pub fn parent(&self, node: Entity) -> Option<Entity> {
        self.world.get::<&Parent>(node).ok().map(|parent| parent.0)
    }

    /// The node's direct children in attachment order.
    pub fn children(&self, node: Entity) -> Vec<Entity> {
        self.world
            .get::<&Children>(node)
            .map(|children| children.0.clone())
            .unwrap_or_default()
    }

    /// Every node without a parent, sorted by name.
    pub fn roots(&self) -> Vec<Entity> {
        let mut roots: Vec<(String, Entity)> = self
            .world
            .query::<&Name>()
            .without::<&Parent>()
            .iter()
            .map(|(entity, name)| (name.0.clone(), entity))
            .collect();

        roots.sort();
        roots.into_iter().map(|(_, entity)| entity).collect()
    }

    /// The node's transform relative to its parent.
    pub fn local_transform(&self, node: Entity) -> Option<Transform> {
        self.world.get::<&Transform>(node).ok().map(|transform| *transform)
    }

    /// Replace the node's local transform.
    pub fn set_local_transform(
        &mut self,
        node: Entity,
        transform: Transform,
    ) -> Result<(), HierarchyError> {
        let mut local = self
            .world
            .get::<&mut Transform>(node)
            .map_err(|_| HierarchyError::NoSuchNode(node))?;
        *local = transform;
        Ok(())
    }

    /// The node's transform in world space.
    pub fn world_transform(&self, node: Entity) -> Option<Transform> {
        self.contains(node)
            .then(|| Transform::from_matrix(self.world_matrix(node)))
    }

    fn world_matrix(&self, node: Entity) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(node);

        while let Some(entity) = current {
            if let Some(local) = self.local_transform(entity) {
                matrix = local.matrix() * matrix;
            }
            current = self.parent(entity);
        }

        matrix
    }

    /// Returns true if `ancestor` appears on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: Entity, node: Entity) -> bool {
        let mut current = self.parent(node);
        while let Some(entity) = current {
            if entity == ancestor {
                return true;
            }
            current = self.parent(entity);
        }
        false
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Move `child` under `parent`, or make it a root when `parent` is `None`.
    ///
    /// The child keeps its world-space placement; its local transform is
    /// recomputed against the new parent.
    pub fn set_parent(
        &mut self,
        child: Entity,
        parent: Option<Entity>,
    ) -> Result<(), HierarchyError> {
        if !self.contains(child) {
            return Err(HierarchyError::NoSuchNode(child));
        }

        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(HierarchyError::NoSuchNode(parent));
            }
            if parent == child || self.is_ancestor(child, parent) {
                return Err(HierarchyError::Cycle { child, parent });
            }
        }

        let world = self.world_matrix(child);
        self.unlink(child);

        let parent_world = match parent {
            Some(parent) => {
                self.link(child, parent);
                self.world_matrix(parent)
            }
            None => Mat4::IDENTITY,
        };

        self.set_local_transform(child, Transform::from_matrix(parent_world.inverse() * world))
    }

    /// Turn every child of `node` into a root, keeping world placement.
    ///
    /// Returns the number of detached children.
    pub fn detach_children(&mut self, node: Entity) -> Result<usize, HierarchyError> {
        let children = self.children(node);
        for child in &children {
            self.set_parent(*child, None)?;
        }
        Ok(children.len())
    }

    /// Schedule `node` and its descendants for destruction at the end of the frame.
    ///
    /// The node stays in the world until [`Self::flush_destroyed`] runs, but is
    /// no longer returned by name lookups. Children moved elsewhere before the
    /// flush survive.
    pub fn destroy(&mut self, node: Entity) {
        if !self.contains(node) || self.is_destroyed(node) {
            return;
        }

        log::debug!("Scheduling '{}' for destruction", self.name(node).unwrap_or_default());
        let _ = self.world.insert_one(node, PendingDestroy);
        self.doomed.push(node);
    }

    /// Remove every scheduled node along with its current subtree.
    ///
    /// Returns the number of entities despawned.
    pub fn flush_destroyed(&mut self) -> usize {
        let doomed = std::mem::take(&mut self.doomed);
        let mut removed = 0;

        for node in doomed {
            // Already gone as part of an earlier subtree
            if !self.contains(node) {
                continue;
            }
            self.unlink(node);
            removed += self.despawn_subtree(node);
        }

        removed
    }

    fn despawn_subtree(&mut self, node: Entity) -> usize {
        let mut stack = vec![node];
        let mut removed = 0;

        while let Some(entity) = stack.pop() {
            stack.extend(self.children(entity));
            if self.world.despawn(entity).is_ok() {
                removed += 1;
            }
        }

        removed
    }

    fn link(&mut self, child: Entity, parent: Entity) {
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.push(child);
        }
        let _ = self.world.insert_one(child, Parent(parent));
    }

    fn unlink(&mut self, child: Entity) {
        let Some(parent) = self.parent(child) else {
            return;
        };

        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.retain(|entity| *entity != child);
        }
        let _ = self.world.remove_one::<Parent>(child);
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: Entity, depth: usize) -> fmt::Result {
        let name = self.name(node).unwrap_or_default();
        let marker = if self.is_destroyed(node) { " (destroyed)" } else { "" };
        writeln!(f, "{:indent$}{}{}", "", name, marker, indent = depth * 2)?;

        for child in self.children(node) {
            self.fmt_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in self.roots() {
            self.fmt_node(f, root, 0)?;
        }
        Ok(())
    }
}
