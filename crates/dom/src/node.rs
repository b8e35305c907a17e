//! DOM Node representation

use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a node in a fragment tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Type of DOM node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Fragment root (the container markup is parsed into)
    Fragment,
    /// Element node (HTML tag)
    Element(ElementData),
    /// Text content
    Text(String),
    /// HTML comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Tag name (lowercase)
    pub tag_name: String,
    /// Attributes in source order, names lowercased
    pub attributes: SmallVec<[(String, String); 4]>,
}

impl ElementData {
    /// Create a new element with the given tag name
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: SmallVec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute value, replacing an existing one in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self
            .attributes
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attributes.remove(index).1)
    }

    /// Check if the element has a class
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add a class unless it is already present
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.get_attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute("class", classes);
    }

    /// Get the element's ID
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Get all classes as a vector
    pub fn classes(&self) -> Vec<&str> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A node in the fragment tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Node type and associated data
    pub node_type: NodeType,
    /// Parent node ID (None for the root and detached nodes)
    pub parent: Option<NodeId>,
    /// Child node IDs
    pub children: SmallVec<[NodeId; 8]>,
}

impl Node {
    /// Create a new node
    pub fn new(id: NodeId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            parent: None,
            children: SmallVec::new(),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element(_))
    }

    /// Whether children may be appended to this node
    pub fn can_have_children(&self) -> bool {
        matches!(self.node_type, NodeType::Fragment | NodeType::Element(_))
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get mutable element data if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get the tag name if this is an element
    pub fn tag_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }
}
