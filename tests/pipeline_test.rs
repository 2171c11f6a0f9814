//! End-to-end pipeline tests over the built-in page renderer.
//!
//! These exercise the full pass sequence (normalize, render, parse,
//! attachments, headings, title, serialize) and pin the structural
//! guarantees: placeholder parity, anchor determinism and uniqueness,
//! attachment inlining, title derivation, and second-pass idempotence.

use cello::convert::{self, AnchorRegistry};
use cello::{Notebook, PageRenderer, RenderConfig, convert_notebook, dom};

async fn convert(json: &str) -> String {
    let notebook = Notebook::parse(json).expect("notebook should parse");
    convert_notebook(
        &PageRenderer::new(),
        notebook,
        &Notebook::default(),
        &RenderConfig::default(),
    )
    .await
    .expect("conversion should succeed")
}

fn markdown_cells(sources: &[&str]) -> String {
    let cells: Vec<String> = sources
        .iter()
        .map(|s| format!(r#"{{"cell_type": "markdown", "source": {}}}"#, serde_json::to_string(s).unwrap()))
        .collect();
    format!(r#"{{"cells": [{}]}}"#, cells.join(","))
}

// ============================================================================
// Structure: cells and navigation placeholders stay in lockstep
// ============================================================================

#[tokio::test]
async fn test_placeholder_count_matches_cell_count() {
    let html = convert(&markdown_cells(&["# A", "text", "## B"])).await;
    let tree = dom::parse(&html);

    let cells = tree.select("ol.cells > li.cell").unwrap();
    let placeholders = tree.select("nav.cells dl dt").unwrap();
    assert_eq!(cells.len(), 3);
    assert_eq!(placeholders.len(), 3);
}

#[tokio::test]
async fn test_one_heading_list_per_cell_with_headings() {
    let html = convert(&markdown_cells(&["# A", "no headings here", "## B\n\n### C"])).await;
    let tree = dom::parse(&html);

    assert_eq!(tree.select("nav.cells dd.headings").unwrap().len(), 2);
    assert_eq!(
        tree.select("nav.cells dd.headings a[data-level]")
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn test_nav_entries_preserve_heading_order_and_level() {
    let html = convert(&markdown_cells(&["## First\n\n# Second"])).await;
    let tree = dom::parse(&html);

    let entries = tree.select("nav.cells dd.headings a").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(tree.text_content(entries[0]), "First");
    assert_eq!(tree.attr(entries[0], "data-level"), Some("2"));
    assert_eq!(tree.attr(entries[0], "href"), Some("#first"));
    assert_eq!(tree.text_content(entries[1]), "Second");
    assert_eq!(tree.attr(entries[1], "data-level"), Some("1"));
}

// ============================================================================
// Anchors: deterministic, unique, explicit ids preserved
// ============================================================================

#[tokio::test]
async fn test_ids_are_deterministic_across_runs() {
    let json = markdown_cells(&["# Overview\n\n## Setup", "## Setup"]);
    let first = convert(&json).await;
    let second = convert(&json).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_duplicate_headings_get_unique_anchors() {
    let html = convert(&markdown_cells(&["# Setup", "# Setup", "# Setup"])).await;
    let tree = dom::parse(&html);

    let headings = tree.select("ol.cells li.cell h1").unwrap();
    let ids: Vec<_> = headings
        .iter()
        .map(|&h| tree.attr(h, "id").unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["setup", "setup-2", "setup-3"]);
}

#[tokio::test]
async fn test_explicit_id_is_preserved_verbatim() {
    let html = convert(&markdown_cells(&["<h2 id=\"my-anchor\">Custom</h2>\n\n## Custom"])).await;
    let tree = dom::parse(&html);

    let headings = tree.select("ol.cells li.cell h2").unwrap();
    assert_eq!(tree.attr(headings[0], "id"), Some("my-anchor"));
    // The generated sibling must not collide with anything.
    assert_eq!(tree.attr(headings[1], "id"), Some("custom"));
}

#[tokio::test]
async fn test_permalink_markers_point_at_headings() {
    let html = convert(&markdown_cells(&["# Overview"])).await;
    assert!(html.contains("<a class=\"h\" href=\"#overview\">\u{00b6}</a>"));
}

// ============================================================================
// Attachments
// ============================================================================

#[tokio::test]
async fn test_attachment_reference_becomes_data_uri() {
    let json = r#"{
        "cells": [{
            "cell_type": "markdown",
            "source": "![plot](attachment:img1)",
            "attachments": {"img1": {"image/png": "aGVsbG8="}}
        }]
    }"#;
    let html = convert(json).await;
    let tree = dom::parse(&html);

    let img = tree.select_first("img").unwrap().expect("has image");
    assert_eq!(tree.attr(img, "src"), Some("data:image/png;base64,aGVsbG8="));
    assert!(tree.element_classes(img).contains(&"attachment".to_string()));
}

#[tokio::test]
async fn test_unresolvable_attachment_reference_is_untouched() {
    let json = r#"{
        "cells": [{
            "cell_type": "markdown",
            "source": "![plot](attachment:missing)"
        }]
    }"#;
    let html = convert(json).await;
    let tree = dom::parse(&html);

    let img = tree.select_first("img").unwrap().expect("has image");
    assert_eq!(tree.attr(img, "src"), Some("attachment:missing"));
}

// ============================================================================
// Title derivation
// ============================================================================

#[tokio::test]
async fn test_first_heading_becomes_title_and_headline() {
    let html = convert(&markdown_cells(&["plain text", "### Overview", "# Ignored"])).await;
    let tree = dom::parse(&html);

    let title = tree.select_first("head title").unwrap().expect("title");
    assert_eq!(tree.text_content(title), "Overview");
    let headline = tree.select_first("header h1").unwrap().expect("headline");
    assert_eq!(tree.text_content(headline), "Overview");
}

#[tokio::test]
async fn test_no_headings_keeps_configured_default() {
    let html = convert(&markdown_cells(&["no headings at all"])).await;
    let tree = dom::parse(&html);

    let title = tree.select_first("head title").unwrap().expect("title");
    assert_eq!(tree.text_content(title), "Notebook");
}

// ============================================================================
// Output representation selection
// ============================================================================

#[tokio::test]
async fn test_html_representation_selected_over_plain_text() {
    let json = r#"{
        "cells": [{
            "cell_type": "code",
            "source": "df",
            "outputs": [{
                "output_type": "execute_result",
                "execution_count": 1,
                "data": {
                    "text/plain": "a table",
                    "text/html": "<table><tr><td>1</td></tr></table>"
                }
            }]
        }]
    }"#;
    let html = convert(json).await;

    assert!(html.contains("<table>"));
    assert!(!html.contains("a table"));
}

#[tokio::test]
async fn test_stream_and_error_outputs_render_as_text() {
    let json = r#"{
        "cells": [{
            "cell_type": "code",
            "source": "1/0",
            "outputs": [
                {"output_type": "stream", "name": "stdout", "text": ["before the crash\n"]},
                {"output_type": "error", "ename": "ZeroDivisionError", "evalue": "division by zero",
                 "traceback": ["Traceback (most recent call last):"]}
            ]
        }]
    }"#;
    let html = convert(json).await;

    assert!(html.contains("before the crash"));
    assert!(html.contains("ZeroDivisionError: division by zero"));
}

// ============================================================================
// Idempotence: a second indexing pass over the finished output is a no-op
// ============================================================================

#[tokio::test]
async fn test_second_indexing_pass_changes_nothing() {
    let html = convert(&markdown_cells(&["# Setup", "# Setup\n\n## More"])).await;

    let mut tree = dom::parse(&html);
    let mut registry = AnchorRegistry::new();
    let entries = convert::headings::index(&mut tree, &mut registry).unwrap();

    let anchors: Vec<_> = entries.iter().map(|e| e.anchor.as_str()).collect();
    assert_eq!(anchors, vec!["setup", "setup-2", "more"]);

    // Heading lists and permalink markers were rebuilt or skipped, never
    // duplicated.
    assert_eq!(tree.select("nav.cells dd.headings").unwrap().len(), 2);
    assert_eq!(tree.select("a.h").unwrap().len(), 3);
}

// ============================================================================
// Malformed input tolerance
// ============================================================================

#[tokio::test]
async fn test_cells_without_outputs_or_attachments_convert() {
    let json = r#"{"cells": [
        {"cell_type": "code", "source": "x = 1"},
        {"cell_type": "widget", "source": "???"},
        {"cell_type": "markdown"}
    ]}"#;
    let html = convert(json).await;
    let tree = dom::parse(&html);

    assert_eq!(tree.select("ol.cells > li.cell").unwrap().len(), 3);
}
