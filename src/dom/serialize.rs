//! Serialization of the arena tree back to HTML text via html5ever.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};

use super::arena::{Dom, NodeData, NodeId};

struct SerializableDom<'a> {
    dom: &'a Dom,
    root: NodeId,
}

impl SerializableDom<'_> {
    fn serialize_node<S>(&self, id: NodeId, serializer: &mut S) -> io::Result<()>
    where
        S: Serializer,
    {
        let Some(node) = self.dom.get(id) else {
            return Ok(());
        };

        match &node.data {
            NodeData::Document => {
                for child in self.dom.children(id) {
                    self.serialize_node(child, serializer)?;
                }
            }
            NodeData::Doctype { name } => serializer.write_doctype(name)?,
            NodeData::Text(text) => serializer.write_text(text)?,
            NodeData::Comment(text) => serializer.write_comment(text)?,
            NodeData::Element { name, attrs, .. } => {
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|a| (&a.name, a.value.as_str())),
                )?;
                for child in self.dom.children(id) {
                    self.serialize_node(child, serializer)?;
                }
                serializer.end_elem(name.clone())?;
            }
        }
        Ok(())
    }
}

impl Serialize for SerializableDom<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => self.serialize_node(self.root, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.dom.children(self.root) {
                    self.serialize_node(child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

impl Dom {
    /// Serialize the whole document to HTML text.
    pub fn serialize(&self) -> String {
        self.serialize_subtree(self.document())
    }

    /// Serialize a subtree (children of `root`) to HTML text.
    pub fn serialize_subtree(&self, root: NodeId) -> String {
        let mut bytes = Vec::new();
        let node = SerializableDom { dom: self, root };
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..SerializeOpts::default()
        };
        // Writing into a Vec<u8> cannot fail.
        let _ = serialize(&mut bytes, &node, opts);
        String::from_utf8(bytes).unwrap_or_default()
    }
}
