//! html5ever TreeSink implementation building a [`Dom`].

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, QualName};

use super::arena::{Attribute, Dom, NodeData, NodeId};

/// Handle used by TreeSink to reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkHandle(pub NodeId);

impl Default for SinkHandle {
    fn default() -> Self {
        SinkHandle(NodeId::NONE)
    }
}

/// TreeSink that builds a [`Dom`].
///
/// Interior mutability is required because the TreeSink trait takes `&self`;
/// the RefCell never escapes this module.
#[derive(Default)]
pub struct DomSink {
    dom: RefCell<Dom>,
}

impl DomSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the sink and return the DOM.
    pub fn into_dom(self) -> Dom {
        self.dom.into_inner()
    }
}

/// Attach a parsed node, or a run of text, under a parent. Text runs merge
/// into a trailing text node so the tree builder's character batches come
/// out as single nodes.
fn attach(dom: &mut Dom, parent: NodeId, child: NodeOrText<SinkHandle>) {
    match child {
        NodeOrText::AppendNode(handle) => dom.append(parent, handle.0),
        NodeOrText::AppendText(text) => dom.append_text(parent, &text),
    }
}

fn own_attrs(attrs: Vec<Html5Attribute>) -> Vec<Attribute> {
    attrs
        .into_iter()
        .map(|attr| Attribute {
            name: attr.name,
            value: attr.value.to_string(),
        })
        .collect()
}

impl TreeSink for DomSink {
    type Handle = SinkHandle;
    type Output = Self;
    type ElemName<'a>
        = &'a QualName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&self, _msg: std::borrow::Cow<'static, str>) {
        // Lenient, like browsers.
    }

    fn get_document(&self) -> Self::Handle {
        SinkHandle(self.dom.borrow().document())
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        static EMPTY: QualName = QualName {
            prefix: None,
            ns: html5ever::ns!(),
            local: html5ever::local_name!(""),
        };

        let dom = self.dom.borrow();
        match dom.get(target.0).map(|node| &node.data) {
            Some(NodeData::Element { name, .. }) => {
                // SAFETY: the QualName lives in the arena, which lives as
                // long as self; the RefCell hides that from the borrow
                // checker. The reference is used immediately by the tree
                // builder and never stored.
                unsafe { std::mem::transmute::<&QualName, &'a QualName>(name) }
            }
            _ => &EMPTY,
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        SinkHandle(self.dom.borrow_mut().create_element(name, own_attrs(attrs)))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        SinkHandle(self.dom.borrow_mut().create_comment(text.to_string()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        // Processing instructions carry nothing the pipeline reads.
        SinkHandle(self.dom.borrow_mut().create_comment(String::new()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        attach(&mut self.dom.borrow_mut(), parent.0, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let parent = self
            .dom
            .borrow()
            .get(element.0)
            .map_or(NodeId::NONE, |node| node.parent);
        if parent.is_some() {
            attach(&mut self.dom.borrow_mut(), parent, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        let mut dom = self.dom.borrow_mut();
        let doctype = dom.create_doctype(name.to_string());
        let document = dom.document();
        dom.append(document, doctype);
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {
        // Quirks mode has no effect on the post-processing passes.
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        let node = match new_node {
            NodeOrText::AppendNode(handle) => handle.0,
            NodeOrText::AppendText(text) => dom.create_text(text.to_string()),
        };
        dom.insert_before(sibling.0, node);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Html5Attribute>) {
        let mut dom = self.dom.borrow_mut();
        let Some(node) = dom.get_mut(target.0) else {
            return;
        };
        let NodeData::Element {
            attrs: existing, ..
        } = &mut node.data
        else {
            return;
        };

        for attr in own_attrs(attrs) {
            if existing.iter().all(|a| a.name != attr.name) {
                existing.push(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.dom.borrow_mut().detach(target.0);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children: Vec<_> = self.dom.borrow().children(node.0).collect();
        let mut dom = self.dom.borrow_mut();
        for child in children {
            dom.detach(child);
            dom.append(new_parent.0, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;

    #[test]
    fn test_basic_parse() {
        let dom = parse("<html><body><p>Hello</p></body></html>");

        assert!(dom.len() > 3);
        let p = dom
            .descendants(dom.document())
            .into_iter()
            .find(|&id| dom.element_name(id).is_some_and(|n| n.as_ref() == "p"))
            .expect("should find p");
        assert_eq!(dom.text_content(p), "Hello");
    }

    #[test]
    fn test_attributes_preserved() {
        let dom = parse(r#"<div id="main" class="container wide">x</div>"#);

        let div = dom
            .descendants(dom.document())
            .into_iter()
            .find(|&id| dom.element_name(id).is_some_and(|n| n.as_ref() == "div"))
            .expect("should find div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.element_classes(div), &["container", "wide"]);
    }
}
