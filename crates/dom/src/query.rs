//! Simple fragment queries (getElementById, getElementsByClassName, etc.)

use crate::node::{ElementData, NodeId};
use crate::tree::DomTree;

/// Lookups that need no selector engine
pub trait Queryable {
    /// First element whose `id` attribute equals `id`
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Elements with the given tag name (`*` for all), in document order
    fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId>;

    /// Elements carrying the given class, in document order
    fn get_elements_by_class_name(&self, class_name: &str) -> Vec<NodeId>;
}

impl DomTree {
    /// Elements below the root satisfying `predicate`, in document order
    fn elements_where(&self, predicate: impl Fn(&ElementData) -> bool) -> Vec<NodeId> {
        self.descendants(self.root_id())
            .into_iter()
            .filter(|&id| self.get(id).and_then(|n| n.as_element()).is_some_and(|e| predicate(e)))
            .collect()
    }
}

impl Queryable for DomTree {
    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_where(|e| e.id() == Some(id)).into_iter().next()
    }

    fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<NodeId> {
        let wanted = tag_name.to_ascii_lowercase();
        self.elements_where(|e| wanted == "*" || e.tag_name == wanted)
    }

    fn get_elements_by_class_name(&self, class_name: &str) -> Vec<NodeId> {
        self.elements_where(|e| e.has_class(class_name))
    }
}
