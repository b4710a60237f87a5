//! Root lookup for hierarchy nodes.

use super::Hierarchy;
use hecs::Entity;

/// Follows parent links from `node` until reaching a node without a parent.
///
/// Returns `node` itself when it is already a root. The walk assumes the
/// hierarchy is acyclic, which [`Hierarchy::set_parent`] guarantees.
pub fn find_root(hierarchy: &Hierarchy, node: Entity) -> Entity {
    match hierarchy.parent(node) {
        Some(parent) => find_root(hierarchy, parent),
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_of_root_is_itself() {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.spawn("Level1", None);

        assert_eq!(find_root(&hierarchy, root), root);
    }

    #[test]
    fn walks_to_top_of_chain() {
        let mut hierarchy = Hierarchy::new();
        let wrapper = hierarchy.spawn("Loader", None);
        let scene = hierarchy.spawn("Level2", Some(wrapper));
        let player = hierarchy.spawn("Player", Some(scene));
        let weapon = hierarchy.spawn("Weapon", Some(player));

        assert_eq!(find_root(&hierarchy, weapon), wrapper);
        assert_eq!(find_root(&hierarchy, scene), wrapper);
    }
}
