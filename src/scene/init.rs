//! Typed initializer registry for loaded scenes.
//!
//! A scene declares which parameter types it accepts by attaching
//! [`SceneInit`] implementations to its root node. When a transition attaches
//! the scene, the controller runs the initializers registered for exactly the
//! request's parameter type; initializers for other types are left alone.
//!
//! Initializers on one node are called in no particular order. Scenes must not
//! depend on one initializer running before another.

use crate::error::HierarchyError;
use crate::hierarchy::Hierarchy;
use hecs::Entity;

/// Receives the parameter passed to a scene transition.
///
/// Closures taking `&T` implement this trait, so simple scenes can register
/// a callback instead of a dedicated type.
pub trait SceneInit<T> {
    /// Called once when the scene owning this initializer finishes loading.
    fn initialized(&mut self, parameter: &T);
}

impl<T, F> SceneInit<T> for F
where
    F: FnMut(&T),
{
    fn initialized(&mut self, parameter: &T) {
        self(parameter)
    }
}

/// Component holding a node's initializers for parameter type `T`.
pub struct Initializers<T: 'static> {
    entries: Vec<Box<dyn SceneInit<T> + Send + Sync>>,
}

impl<T: 'static> Initializers<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Hierarchy {
    /// Register an initializer on `node` for transitions carrying a `T`.
    pub fn add_initializer<T, I>(
        &mut self,
        node: Entity,
        initializer: I,
    ) -> Result<(), HierarchyError>
    where
        T: 'static,
        I: SceneInit<T> + Send + Sync + 'static,
    {
        if let Ok(mut list) = self.world().get::<&mut Initializers<T>>(node) {
            list.entries.push(Box::new(initializer));
            return Ok(());
        }

        let list = Initializers::<T> {
            entries: vec![Box::new(initializer)],
        };
        self.world_mut()
            .insert_one(node, list)
            .map_err(|_| HierarchyError::NoSuchNode(node))
    }

    /// Number of initializers on `node` that accept a `T`.
    pub fn initializer_count<T: 'static>(&self, node: Entity) -> usize {
        self.world()
            .get::<&Initializers<T>>(node)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

/// Call every `T` initializer on `node` once. Returns how many ran.
pub(crate) fn initialize_scene<T: 'static>(
    hierarchy: &Hierarchy,
    node: Entity,
    parameter: &T,
) -> usize {
    let Ok(mut list) = hierarchy.world().get::<&mut Initializers<T>>(node) else {
        return 0;
    };

    for entry in list.entries.iter_mut() {
        entry.initialized(parameter);
    }
    list.entries.len()
}
