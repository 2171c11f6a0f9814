//! Pre-render cell output normalization.
//!
//! Markdown cells carry raw source only; the rendering backend works in
//! terms of output bundles. This pass synthesizes a `display_data` output
//! for each non-blank markdown cell carrying both the HTML rendering and the
//! raw markdown, so the backend can choose a representation like it does for
//! any other output. Runs exactly once per render, strictly before the
//! backend is invoked.

use serde_json::{Map, Value};

use super::{Cell, CellKind, MimeBundle, Notebook, Output};

/// Normalize cell outputs in place.
///
/// `render_markdown` is the markdown seam: source text in, HTML fragment
/// out. Code and raw cells pass through unchanged; whitespace-only markdown
/// cells synthesize nothing.
pub fn normalize(notebook: &mut Notebook, render_markdown: impl Fn(&str) -> String) {
    for cell in &mut notebook.cells {
        if cell.cell_type != CellKind::Markdown || cell.source.is_blank() {
            continue;
        }
        let display = synthesize_display(cell, &render_markdown);
        cell.outputs = vec![display];
    }
}

fn synthesize_display(cell: &Cell, render_markdown: &impl Fn(&str) -> String) -> Output {
    let mut data = MimeBundle::new();
    // HTML first so default priority selects it; the raw markdown rides
    // along as an alternate representation.
    data.insert(
        "text/html".to_string(),
        Value::String(render_markdown(cell.source.as_str())),
    );
    data.insert(
        "text/markdown".to_string(),
        Value::String(cell.source.as_str().to_string()),
    );
    Output::DisplayData {
        data,
        metadata: Map::new(),
    }
}
