//! Fragment tree structure

use rustc_hash::FxHashMap;
use std::fmt;

use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Node, NodeId, NodeType};

/// Fragment tree that owns all nodes
#[derive(Clone)]
pub struct DomTree {
    /// All nodes in the tree
    nodes: FxHashMap<NodeId, Node>,
    /// Next available node ID
    next_id: u32,
    /// Fragment root node
    root_id: NodeId,
}

impl DomTree {
    /// Create a new tree holding only the fragment root
    pub fn new() -> Self {
        let root_id = NodeId::new(0);
        let root = Node::new(root_id, NodeType::Fragment);

        let mut nodes = FxHashMap::default();
        nodes.insert(root_id, root);

        Self {
            nodes,
            next_id: 1,
            root_id,
        }
    }

    /// Get the fragment root ID
    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn insert(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, node_type));
        id
    }

    /// Create a new detached element node
    pub fn create_element(&mut self, tag_name: impl Into<String>) -> NodeId {
        self.insert(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Create a new detached text node
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.insert(NodeType::Text(content.into()))
    }

    /// Create a new detached comment node
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.insert(NodeType::Comment(content.into()))
    }

    /// Append a child node to a parent, detaching it from any previous parent
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        let parent = self.get(parent_id).ok_or(DomError::NodeNotFound(parent_id.0))?;
        if !parent.can_have_children() {
            return Err(DomError::NotAContainer(parent_id.0));
        }
        let old_parent = self.get(child_id).ok_or(DomError::NodeNotFound(child_id.0))?.parent;

        if child_id == parent_id || self.ancestors(parent_id).contains(&child_id) {
            return Err(DomError::HierarchyCycle { child: child_id.0 });
        }

        if let Some(old_parent) = old_parent {
            self.remove_child(old_parent, child_id)?;
        }

        if let Some(child) = self.get_mut(child_id) {
            child.parent = Some(parent_id);
        }
        if let Some(parent) = self.get_mut(parent_id) {
            parent.children.push(child_id);
        }

        Ok(())
    }

    /// Remove a node from its parent
    pub fn remove_child(&mut self, parent_id: NodeId, child_id: NodeId) -> DomResult<()> {
        {
            let parent = self.get_mut(parent_id).ok_or(DomError::NodeNotFound(parent_id.0))?;
            parent.children.retain(|id| *id != child_id);
        }

        let child = self.get_mut(child_id).ok_or(DomError::NodeNotFound(child_id.0))?;
        child.parent = None;

        Ok(())
    }

    /// Get the parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    /// Get the element children of a node, skipping text and comments
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|&child| self.get(child).map(Node::is_element).unwrap_or(false))
            .collect()
    }

    /// Ancestors of a node, nearest first, ending at the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.parent(ancestor);
        }
        result
    }

    /// All descendants of a node in document order (depth-first, pre-order)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.collect_descendants(id, &mut result);
        result
    }

    fn collect_descendants(&self, id: NodeId, result: &mut Vec<NodeId>) {
        if let Some(node) = self.get(id) {
            for &child_id in &node.children {
                result.push(child_id);
                self.collect_descendants(child_id, result);
            }
        }
    }

    /// Get the text content of a node and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, result: &mut String) {
        if let Some(node) = self.get(id) {
            match &node.node_type {
                NodeType::Text(text) => result.push_str(text),
                NodeType::Comment(_) => {}
                _ => {
                    for &child_id in &node.children {
                        self.collect_text(child_id, result);
                    }
                }
            }
        }
    }

    /// Serialize the markup of a node's children (like `innerHTML`)
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut output = String::new();
        for child in self.children(id) {
            self.serialize_node(child, &mut output);
        }
        output
    }

    /// Serialize the whole fragment back to markup
    pub fn serialize(&self) -> String {
        self.inner_html(self.root_id)
    }

    fn serialize_node(&self, id: NodeId, output: &mut String) {
        let Some(node) = self.get(id) else { return };
        match &node.node_type {
            NodeType::Fragment => output.push_str(&self.inner_html(id)),
            NodeType::Element(elem) => {
                output.push('<');
                output.push_str(&elem.tag_name);
                for (name, value) in &elem.attributes {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&escape(value, true));
                    output.push('"');
                }
                output.push('>');
                if is_void_element(&elem.tag_name) {
                    return;
                }
                for &child in &node.children {
                    self.serialize_node(child, output);
                }
                output.push_str("</");
                output.push_str(&elem.tag_name);
                output.push('>');
            }
            NodeType::Text(text) => output.push_str(&escape(text, false)),
            NodeType::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
        }
    }

    /// Get the number of nodes in the tree, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pretty print the tree for debugging
    pub fn pretty_print(&self) -> String {
        let mut output = String::new();
        self.print_node(self.root_id, 0, &mut output);
        output
    }

    fn print_node(&self, id: NodeId, depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);

        if let Some(node) = self.get(id) {
            match &node.node_type {
                NodeType::Fragment => {
                    output.push_str("#fragment\n");
                }
                NodeType::Element(elem) => {
                    let attrs: Vec<String> = elem
                        .attributes
                        .iter()
                        .map(|(k, v)| format!("{}=\"{}\"", k, v))
                        .collect();
                    let attrs_str = if attrs.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", attrs.join(" "))
                    };
                    output.push_str(&format!("{}<{}{}>\n", indent, elem.tag_name, attrs_str));
                }
                NodeType::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        output.push_str(&format!("{}#text: {:?}\n", indent, trimmed));
                    }
                }
                NodeType::Comment(text) => {
                    output.push_str(&format!("{}<!-- {} -->\n", indent, text));
                }
            }

            for &child_id in &node.children {
                self.print_node(child_id, depth + 1, output);
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DomTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_print())
    }
}

/// Check if an element is a void element (never has children or an end tag)
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input"
        | "link" | "meta" | "param" | "source" | "track" | "wbr"
    )
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let first = tree.create_element("li");
        let second = tree.create_element("li");
        let text = tree.create_text("Item 1");

        tree.append_child(tree.root_id(), ul).unwrap();
        tree.append_child(ul, first).unwrap();
        tree.append_child(first, text).unwrap();
        tree.append_child(ul, second).unwrap();
        (tree, ul, first, second)
    }

    #[test]
    fn test_create_elements() {
        let (tree, ul, first, _) = list_tree();

        assert_eq!(tree.len(), 5); // root + ul + 2 li + text
        assert_eq!(tree.text_content(ul), "Item 1");
        assert_eq!(tree.parent(first), Some(ul));
        assert_eq!(tree.ancestors(first), vec![ul, tree.root_id()]);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let (tree, ul, first, second) = list_tree();
        let descendants = tree.descendants(tree.root_id());

        assert_eq!(descendants[0], ul);
        assert_eq!(descendants[1], first);
        assert_eq!(descendants[3], second);
        assert_eq!(tree.element_children(ul), vec![first, second]);
    }

    #[test]
    fn test_append_moves_node() {
        let (mut tree, ul, first, second) = list_tree();
        tree.append_child(second, first).unwrap();

        assert_eq!(tree.children(ul), vec![second]);
        assert_eq!(tree.parent(first), Some(second));
    }

    #[test]
    fn test_append_rejects_cycles_and_text_parents() {
        let (mut tree, ul, first, _) = list_tree();
        assert!(matches!(
            tree.append_child(first, ul),
            Err(DomError::HierarchyCycle { .. })
        ));

        let text = tree.children(first)[0];
        let span = tree.create_element("span");
        assert!(matches!(tree.append_child(text, span), Err(DomError::NotAContainer(_))));
    }

    #[test]
    fn test_serialize() {
        let (mut tree, _, _, second) = list_tree();
        let input = tree.create_element("input");
        tree.get_mut(input)
            .unwrap()
            .as_element_mut()
            .unwrap()
            .set_attribute("type", "text");
        tree.append_child(second, input).unwrap();
        let amp = tree.create_text("a & b");
        tree.append_child(second, amp).unwrap();

        assert_eq!(
            tree.serialize(),
            "<ul><li>Item 1</li><li><input type=\"text\">a &amp; b</li></ul>"
        );
    }
}
