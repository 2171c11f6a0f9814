//! Heading indexing: anchor assignment, navigation entries, permalinks.
//!
//! The rendered tree carries one content entry per cell and one navigation
//! placeholder per cell, generated in lockstep; the two lists are matched by
//! position. Each heading found in a cell's output container gets an anchor
//! id (author-provided ids are preserved and registered), a navigation entry
//! grouped under that cell's placeholder, and a permalink marker.
//!
//! The pass is idempotent: ids already present are never regenerated, a
//! cell's heading list is rebuilt rather than duplicated, and existing
//! permalink markers are detected.

use crate::dom::{Dom, NodeId};
use crate::error::Result;

use super::slug::AnchorRegistry;

/// A navigation entry: one per heading, in document order, grouped under
/// the cell that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Heading level, 1-6.
    pub level: u8,
    /// Display text.
    pub text: String,
    /// Anchor id the entry links to.
    pub anchor: String,
}

/// Walk cells in document order, assign anchors, and build the navigation
/// tree. Returns the entries in the order they were created.
pub fn index(dom: &mut Dom, registry: &mut AnchorRegistry) -> Result<Vec<NavEntry>> {
    let cells = dom.select("ol.cells > li.cell")?;
    let placeholders = dom.select("nav.cells dl dt")?;
    let mut entries = Vec::new();

    for (position, &cell) in cells.iter().enumerate() {
        let Some(&placeholder) = placeholders.get(position) else {
            tracing::warn!(position, "cell without a navigation placeholder");
            continue;
        };

        let Some(container) = dom.select_in(cell, "details.outputs")?.into_iter().next() else {
            continue;
        };
        let headings = dom.select_in(container, "h1, h2, h3, h4, h5, h6")?;
        if headings.is_empty() {
            continue;
        }

        // A second pass over an already-processed tree rebuilds this cell's
        // list instead of appending a duplicate.
        remove_stale_list(dom, placeholder);

        let list = dom.new_element("dd", &[("class", "headings")]);
        dom.insert_after(placeholder, list);

        for heading in headings {
            let anchor = match dom.attr(heading, "id").map(str::to_string) {
                Some(id) => {
                    // Author-provided ids are preserved verbatim even when
                    // they collide; generated ids will steer around them.
                    if !registry.reserve(&id) {
                        tracing::warn!(id = %id, "duplicate explicit heading id");
                    }
                    id
                }
                None => {
                    let text = dom.text_content(heading);
                    let id = registry.assign(&text);
                    dom.set_attr(heading, "id", &id);
                    id
                }
            };
            let level = heading_level(dom, heading);
            let text = display_text(dom, heading);

            let entry = dom.new_element(
                "a",
                &[
                    ("data-level", level.to_string().as_str()),
                    ("href", format!("#{anchor}").as_str()),
                ],
            );
            dom.append_text(entry, &text);
            dom.append(list, entry);

            insert_permalink(dom, heading, &anchor);

            entries.push(NavEntry {
                level,
                text,
                anchor,
            });
        }
    }

    Ok(entries)
}

/// Concatenated descendant text with collapsed whitespace.
fn display_text(dom: &Dom, id: NodeId) -> String {
    dom.text_content(id)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading_level(dom: &Dom, id: NodeId) -> u8 {
    dom.element_name(id)
        .and_then(|name| name.as_ref().strip_prefix('h'))
        .and_then(|digit| digit.parse().ok())
        .unwrap_or(6)
}

fn next_element(dom: &Dom, id: NodeId) -> Option<NodeId> {
    let mut current = dom.get(id)?.next_sibling;
    while current.is_some() {
        if dom.is_element(current) {
            return Some(current);
        }
        current = dom.get(current)?.next_sibling;
    }
    None
}

fn prev_element(dom: &Dom, id: NodeId) -> Option<NodeId> {
    let mut current = dom.get(id)?.prev_sibling;
    while current.is_some() {
        if dom.is_element(current) {
            return Some(current);
        }
        current = dom.get(current)?.prev_sibling;
    }
    None
}

fn remove_stale_list(dom: &mut Dom, placeholder: NodeId) {
    if let Some(next) = next_element(dom, placeholder) {
        if dom.element_name(next).is_some_and(|n| n.as_ref() == "dd")
            && dom.element_classes(next).iter().any(|c| c == "headings")
        {
            dom.detach(next);
        }
    }
}

/// Insert a permalink marker immediately before the heading, or before its
/// enclosing group when the heading is wrapped in one.
fn insert_permalink(dom: &mut Dom, heading: NodeId, anchor: &str) {
    let parent = dom.get(heading).map(|n| n.parent).unwrap_or(NodeId::NONE);
    let target = if dom
        .element_name(parent)
        .is_some_and(|n| n.as_ref() == "hgroup")
    {
        parent
    } else {
        heading
    };

    let href = format!("#{anchor}");
    if let Some(prev) = prev_element(dom, target) {
        let is_marker = dom.element_name(prev).is_some_and(|n| n.as_ref() == "a")
            && dom.element_classes(prev).iter().any(|c| c == "h")
            && dom.attr(prev, "href") == Some(href.as_str());
        if is_marker {
            return;
        }
    }

    let marker = dom.new_element("a", &[("class", "h"), ("href", &href)]);
    dom.append_text(marker, "\u{00b6}");
    dom.insert_before(target, marker);
}
