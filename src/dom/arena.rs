//! Arena-based mutable HTML tree.
//!
//! Nodes live in a contiguous vector; parent/child/sibling links are indices
//! into it. The node shape is a closed tagged enum (element with
//! name/attributes/children, text, comment, doctype) with explicit accessor
//! methods, so tree walks never depend on loosely-typed attribute bags.
//!
//! The tree is owned by exactly one render at a time; mutation methods take
//! `&mut self` and there is no interior mutability outside the parsing sink.

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast selector matching.
        id: Option<String>,
        /// Pre-extracted classes for fast selector matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (preserved through serialization).
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the tree.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Qualified name for an HTML element or attribute in the null namespace.
pub(crate) fn html_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

pub(crate) fn attr_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

/// Mutable HTML document tree.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Dom {
    /// Create an empty tree with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the arena (detached nodes included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let (id, classes) = extract_id_and_classes(&attrs);
        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create an element from a tag name and string attribute pairs.
    pub fn new_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: attr_name(name),
                value: (*value).to_string(),
            })
            .collect();
        self.create_element(html_name(tag), attrs)
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype { name }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if last_child.is_some() {
            if let Some(last_node) = self.get_mut(last_child) {
                last_node.next_sibling = child;
            }
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Append text to an existing trailing text node, or create a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child) {
            if let NodeData::Text(existing) = &mut last.data {
                existing.push_str(text);
                return;
            }
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(NodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node after a sibling.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let next = self
            .get(sibling)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
            self.append(parent, new_node);
        }
    }

    /// Unlink a node from its parent. The node stays in the arena and can be
    /// re-attached.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Wrap a node in a new element, which takes the node's place in the
    /// tree.
    pub fn wrap(&mut self, target: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let wrapper = self.new_element(tag, attrs);
        self.insert_before(target, wrapper);
        self.detach(target);
        self.append(wrapper, target);
        wrapper
    }

    /// Replace a node's children with a single text node.
    pub fn set_text(&mut self, target: NodeId, text: &str) {
        let children: Vec<_> = self.children(target).collect();
        for child in children {
            self.detach(child);
        }
        let text_node = self.create_text(text.to_string());
        self.append(target, text_node);
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Pre-order traversal of the subtree rooted at `root`, root excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<_> = {
            let mut children: Vec<_> = self.children(root).collect();
            children.reverse();
            children
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_id_and_classes(attrs: &[Attribute]) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes = Vec::new();
    for attr in attrs {
        if attr.name.local.as_ref() == "id" {
            id = Some(attr.value.clone());
        } else if attr.name.local.as_ref() == "class" {
            classes = attr
                .value
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
        }
    }
    (id, classes)
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Element accessors.
impl Dom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, replacing any existing value. The cached id/class
    /// extraction stays in sync so selector matching sees the new value.
    pub fn set_attr(&mut self, target: NodeId, name: &str, value: &str) {
        let Some(node) = self.get_mut(target) else {
            return;
        };
        let NodeData::Element {
            attrs, id, classes, ..
        } = &mut node.data
        else {
            return;
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute {
                name: attr_name(name),
                value: value.to_string(),
            }),
        }

        if name == "id" {
            *id = Some(value.to_string());
        } else if name == "class" {
            *classes = value.split_whitespace().map(|s| s.to_string()).collect();
        }
    }

    /// Append a class to an element's class list.
    pub fn add_class(&mut self, target: NodeId, class: &str) {
        let current = self.attr(target, "class").unwrap_or_default();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let merged = if current.is_empty() {
            class.to_string()
        } else {
            format!("{current} {class}")
        };
        self.set_attr(target, "class", &merged);
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: NodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Concatenated text of all descendant text nodes, in document order.
    /// Headings wrapping inline markup (anchors, emphasis) flatten to their
    /// display text this way.
    pub fn text_content(&self, root: NodeId) -> String {
        let mut out = String::new();
        if let Some(node) = self.get(root) {
            if let NodeData::Text(s) = &node.data {
                out.push_str(s);
            }
        }
        for id in self.descendants(root) {
            if let Some(node) = self.get(id) {
                if let NodeData::Text(s) = &node.data {
                    out.push_str(s);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_append() {
        let mut dom = Dom::new();
        let div = dom.new_element("div", &[("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
    }

    #[test]
    fn test_children_order() {
        let mut dom = Dom::new();
        let parent = dom.new_element("div", &[]);
        let a = dom.new_element("p", &[]);
        let b = dom.new_element("p", &[]);
        dom.append(dom.document(), parent);
        dom.append(parent, a);
        dom.append(parent, b);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![a, b]);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut dom = Dom::new();
        let parent = dom.new_element("div", &[]);
        let b = dom.new_element("i", &[]);
        dom.append(dom.document(), parent);
        dom.append(parent, b);

        let a = dom.new_element("b", &[]);
        dom.insert_before(b, a);
        let c = dom.new_element("u", &[]);
        dom.insert_after(b, c);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![a, b, c]);
    }

    #[test]
    fn test_wrap() {
        let mut dom = Dom::new();
        let parent = dom.new_element("div", &[]);
        let img = dom.new_element("img", &[]);
        dom.append(dom.document(), parent);
        dom.append(parent, img);

        let figure = dom.wrap(img, "figure", &[("class", "attachment")]);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![figure]);
        let inner: Vec<_> = dom.children(figure).collect();
        assert_eq!(inner, vec![img]);
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut dom = Dom::new();
        let title = dom.new_element("title", &[]);
        dom.append(dom.document(), title);
        dom.append_text(title, "Old");

        dom.set_text(title, "New");

        assert_eq!(dom.text_content(title), "New");
        assert_eq!(dom.children(title).count(), 1);
    }

    #[test]
    fn test_set_attr_updates_cached_classes() {
        let mut dom = Dom::new();
        let img = dom.new_element("img", &[("class", "plot")]);
        dom.append(dom.document(), img);

        dom.add_class(img, "attachment");

        assert_eq!(dom.attr(img, "class"), Some("plot attachment"));
        assert_eq!(dom.element_classes(img), &["plot", "attachment"]);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let mut dom = Dom::new();
        let h1 = dom.new_element("h1", &[]);
        let em = dom.new_element("em", &[]);
        dom.append(dom.document(), h1);
        dom.append_text(h1, "Hello ");
        dom.append(h1, em);
        dom.append_text(em, "World");

        assert_eq!(dom.text_content(h1), "Hello World");
    }
}
