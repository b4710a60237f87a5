//! Components every hierarchy node carries.

use hecs::Entity;

/// Name of a node. Lookups by name return the first live match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name(pub String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Link to the node's parent. Root nodes have no `Parent` component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered list of the node's direct children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

/// Marker for nodes scheduled for removal at the end of the frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingDestroy;
