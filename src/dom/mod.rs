//! HTML document tree: parse, select, mutate, serialize.
//!
//! html5ever parses into an arena tree ([`arena`]), CSS selector matching
//! runs through the `selectors` crate ([`select`]), and serialization goes
//! back through html5ever ([`serialize`]). One render owns one tree; nothing
//! here is shared across renders.

mod arena;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, ChildrenIter, Dom, Node, NodeData, NodeId};
pub use select::Pattern;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

/// Parse HTML text into a mutable document tree.
///
/// Parsing is lenient in the browser sense; malformed markup never fails.
pub fn parse(html: &str) -> Dom {
    let sink = DomSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_dom()
}
