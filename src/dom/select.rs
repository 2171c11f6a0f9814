//! CSS selector matching over the arena tree.
//!
//! Implements the `selectors` crate's `Element` interface for [`Dom`] nodes
//! and exposes a small query API: [`Pattern`] plus [`Dom::select`] /
//! [`Dom::select_first`] / [`Dom::select_in`], all in document order.
//!
//! The query surface is static-tree only: no pseudo-classes, no pseudo
//! elements, no shadow DOM. Both pseudo types are uninhabited, so their
//! match arms are unreachable by construction.

use std::fmt;

use html5ever::{LocalName, Namespace};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{ParseRelative, Selector, SelectorList, SelectorParseErrorKind};
use selectors::{OpaqueElement, SelectorImpl};

use crate::error::{Error, Result};

use super::arena::{Attribute, Dom, Node, NodeData, NodeId};

/// Selector implementation marker for this crate's DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomSelectors;

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = 0x811c_9dc5_u32;
    for &byte in bytes {
        hash = (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193);
    }
    hash
}

/// The `selectors` crate wants several string-ish wrapper types, all with
/// the same trait surface (CSS serialization, precomputed hashing, string
/// conversions). One macro, three instantiations.
macro_rules! selector_ident {
    ($($(#[$doc:meta])* $name:ident wraps $inner:ty;)+) => {$(
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct $name(pub $inner);

        impl cssparser::ToCss for $name {
            fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
                dest.write_str(self.0.as_ref())
            }
        }

        impl precomputed_hash::PrecomputedHash for $name {
            fn precomputed_hash(&self) -> u32 {
                fnv1a(self.as_ref().as_bytes())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_ref()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value.into())
            }
        }

        impl<'a> From<&'a str> for $name {
            fn from(value: &'a str) -> Self {
                Self(value.into())
            }
        }
    )+};
}

selector_ident! {
    /// Attribute values, identifiers, and namespace prefixes.
    IdentStr wraps String;
    /// Element and attribute local names.
    CssLocalName wraps LocalName;
    /// Namespace URLs.
    CssNamespace wraps Namespace;
}

/// Uninhabited: the query surface never parses a pseudo-element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = DomSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        match *self {}
    }

    fn valid_after_slotted(&self) -> bool {
        match *self {}
    }
}

/// Uninhabited: non-tree-structural pseudo-classes have no meaning in a
/// static tree, and the parser rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = DomSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl<'i> selectors::parser::Parser<'i> for DomSelectors {
    type Impl = DomSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

impl SelectorImpl for DomSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Reference to an element for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a Dom, id: NodeId) -> Self {
        Self { dom, id }
    }

    fn data(&self) -> Option<&'a NodeData> {
        self.dom.get(self.id).map(|node| &node.data)
    }

    fn attr_list(&self) -> &'a [Attribute] {
        match self.data() {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Follow a sibling link until the next element, in either direction.
    fn sibling_element(&self, step: impl Fn(&Node) -> NodeId) -> Option<ElementRef<'a>> {
        let mut id = step(self.dom.get(self.id)?);
        while let Some(node) = self.dom.get(id) {
            if matches!(node.data, NodeData::Element { .. }) {
                return Some(ElementRef::new(self.dom, id));
            }
            id = step(node);
        }
        None
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementRef({:?})", self.dom.element_name(self.id))
    }
}

impl selectors::Element for ElementRef<'_> {
    type Impl = DomSelectors;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.dom.get(self.id)?.parent;
        self.dom
            .is_element(parent)
            .then(|| Self::new(self.dom, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|node| node.prev_sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(|node| node.next_sibling)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find(|&child| self.dom.is_element(child))
            .map(|child| Self::new(self.dom, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom.element_name(self.id) == Some(&name.0)
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        self.dom.element_namespace(self.id) == Some(&ns.0)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        self.attr_list()
            .iter()
            .filter(|attr| match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(url) => attr.name.ns == url.0,
            })
            .find(|attr| attr.name.local == local_name.0)
            .is_some_and(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        matches!(
            self.data(),
            Some(NodeData::Element { name, attrs, .. })
                if name.local.as_ref() == "a"
                    && attrs.iter().any(|attr| attr.name.local.as_ref() == "href")
        )
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_id(self.id)
            .is_some_and(|elem_id| case_sensitivity.eq(elem_id.as_bytes(), id.as_ref().as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.dom
            .element_classes(self.id)
            .iter()
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.as_ref().as_bytes()))
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self.dom.children(self.id).any(|child| {
            match self.dom.get(child).map(|node| &node.data) {
                Some(NodeData::Element { .. }) => true,
                Some(NodeData::Text(text)) => !text.trim().is_empty(),
                _ => false,
            }
        })
    }

    fn is_root(&self) -> bool {
        let parent = self.dom.get(self.id).map_or(NodeId::NONE, |node| node.parent);
        matches!(
            self.dom.get(parent).map(|node| &node.data),
            Some(NodeData::Document)
        )
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// A parsed, reusable CSS selector list.
pub struct Pattern {
    selectors: Vec<Selector<DomSelectors>>,
}

impl Pattern {
    /// Parse a comma-separated CSS selector list.
    pub fn parse(css: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(css);
        let mut parser = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&DomSelectors, &mut parser, ParseRelative::No)
            .map_err(|e| Error::Selector(format!("{css}: {e:?}")))?;
        Ok(Self {
            selectors: list.slice().to_vec(),
        })
    }

    /// Check whether a node matches any selector in the list.
    pub fn matches(&self, dom: &Dom, id: NodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }
        let elem = ElementRef::new(dom, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        self.selectors
            .iter()
            .any(|s| selectors::matching::matches_selector(s, 0, None, &elem, &mut context))
    }
}

impl Dom {
    /// All elements matching a CSS selector, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<NodeId>> {
        self.select_in(self.document(), css)
    }

    /// First element matching a CSS selector, in document order.
    pub fn select_first(&self, css: &str) -> Result<Option<NodeId>> {
        Ok(self.select(css)?.into_iter().next())
    }

    /// All elements under `root` (root excluded) matching a CSS selector,
    /// in document order.
    pub fn select_in(&self, root: NodeId, css: &str) -> Result<Vec<NodeId>> {
        let pattern = Pattern::parse(css)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&id| pattern.matches(self, id))
            .collect())
    }
}
