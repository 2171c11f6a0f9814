//! Built-in page renderer.
//!
//! Produces the raw page markup the post-processing passes operate on: a
//! head with the default title, a header headline, one navigation
//! placeholder per cell, and one content entry per cell, generated in
//! lockstep so downstream passes can match them by position. The settings
//! document and the full configuration are embedded as a JSON block for
//! in-page scripts.

use std::fmt::Write;
use std::future::Future;

use serde_json::{Value, json};

use crate::error::Result;
use crate::notebook::{self, Cell, CellKind, MimeBundle, Notebook, Output};

use super::{Highlighter, Orientation, RenderConfig, Renderer, escape_html};

/// The built-in rendering backend.
pub struct PageRenderer {
    highlighter: Highlighter,
}

impl PageRenderer {
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }

    fn render_page(
        &self,
        notebook: &Notebook,
        settings: &Notebook,
        config: &RenderConfig,
    ) -> String {
        let language = notebook.language().unwrap_or("text").to_string();
        let title = escape_html(&config.default_title);

        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{title}</title>");
        out.push_str("</head>\n");

        let readonly = if config.readonly { " readonly" } else { "" };
        let _ = writeln!(
            out,
            "<body class=\"{}{readonly}\">",
            config.orientation.as_str()
        );
        let _ = writeln!(out, "<header>\n<hgroup>\n<h1>{title}</h1>\n</hgroup>\n</header>");

        self.render_nav(&mut out, notebook, config);

        out.push_str("<main>\n<ol class=\"cells\">\n");
        for (index, cell) in notebook.cells.iter().enumerate() {
            self.render_cell(&mut out, cell, index, &language, config);
        }
        out.push_str("</ol>\n</main>\n");

        let payload = json!({
            "settings": settings,
            "config": config.to_json(),
        });
        let _ = writeln!(
            out,
            "<script type=\"application/json\" class=\"page-data\">{}</script>",
            json_for_script(&payload)
        );

        out.push_str("</body>\n</html>\n");
        out
    }

    /// One placeholder per cell, in document order. The heading indexer
    /// fills these in after the output tree exists.
    fn render_nav(&self, out: &mut String, notebook: &Notebook, config: &RenderConfig) {
        let open = if config.navigation_expanded { " open" } else { "" };
        let _ = writeln!(out, "<details class=\"nav\"{open}>");
        out.push_str("<summary>Contents</summary>\n<nav class=\"cells\">\n<dl>\n");
        for (index, cell) in notebook.cells.iter().enumerate() {
            let _ = writeln!(
                out,
                "<dt class=\"cell-ref {}\">Cell {}</dt>",
                cell.cell_type,
                index + 1
            );
        }
        out.push_str("</dl>\n</nav>\n</details>\n");
    }

    fn render_cell(
        &self,
        out: &mut String,
        cell: &Cell,
        index: usize,
        language: &str,
        config: &RenderConfig,
    ) {
        let _ = writeln!(
            out,
            "<li class=\"cell {}\" aria-posinset=\"{}\">",
            cell.cell_type,
            index + 1
        );
        match cell.cell_type {
            CellKind::Code => match config.orientation {
                Orientation::InOut => {
                    self.render_source(out, cell, language, config);
                    self.render_outputs(out, cell);
                }
                Orientation::OutIn => {
                    self.render_outputs(out, cell);
                    self.render_source(out, cell, language, config);
                }
                Orientation::NoSource => self.render_outputs(out, cell),
            },
            CellKind::Markdown => self.render_outputs(out, cell),
            CellKind::Raw => {
                let _ = writeln!(
                    out,
                    "<pre class=\"source raw\">{}</pre>",
                    escape_html(cell.source.as_str())
                );
            }
        }
        out.push_str("</li>\n");
    }

    fn render_source(&self, out: &mut String, cell: &Cell, language: &str, config: &RenderConfig) {
        let editable = if config.readonly {
            ""
        } else {
            " contenteditable=\"true\" spellcheck=\"false\""
        };
        let _ = writeln!(
            out,
            "<pre class=\"source\"{editable}><code class=\"language-{}\">{}</code></pre>",
            escape_html(language),
            self.highlighter.highlight(cell.source.as_str(), language)
        );
    }

    fn render_outputs(&self, out: &mut String, cell: &Cell) {
        out.push_str("<details class=\"outputs\" open>\n<summary>Output</summary>\n");
        for output in &cell.outputs {
            self.render_output(out, output);
        }
        out.push_str("</details>\n");
    }

    fn render_output(&self, out: &mut String, output: &Output) {
        match output {
            Output::Stream { name, text } => {
                let _ = writeln!(
                    out,
                    "<pre class=\"output stream {}\">{}</pre>",
                    escape_html(name),
                    escape_html(text.as_str())
                );
            }
            Output::Error {
                ename,
                evalue,
                traceback,
            } => {
                let mut body = format!("{ename}: {evalue}");
                for line in traceback {
                    body.push('\n');
                    body.push_str(line);
                }
                let _ = writeln!(out, "<pre class=\"output error\">{}</pre>", escape_html(&body));
            }
            Output::DisplayData { data, .. } | Output::ExecuteResult { data, .. } => {
                self.render_bundle(out, data);
            }
        }
    }

    /// Render the selected representation of a bundle. The others are
    /// retained in the notebook but not shown.
    fn render_bundle(&self, out: &mut String, bundle: &MimeBundle) {
        let Some((mime, value)) = notebook::select_representation(bundle) else {
            return;
        };
        match mime {
            "text/html" | "image/svg+xml" => {
                let _ = writeln!(
                    out,
                    "<div class=\"output display\">{}</div>",
                    notebook::representation_text(value)
                );
            }
            m if m.starts_with("image/") => {
                let payload: String = notebook::representation_text(value)
                    .split_whitespace()
                    .collect();
                let _ = writeln!(
                    out,
                    "<img class=\"output display\" src=\"data:{};base64,{payload}\">",
                    escape_html(m)
                );
            }
            "application/json" => {
                let text = serde_json::to_string_pretty(value).unwrap_or_default();
                let _ = writeln!(out, "<pre class=\"output json\">{}</pre>", escape_html(&text));
            }
            _ => {
                let _ = writeln!(
                    out,
                    "<pre class=\"output\">{}</pre>",
                    escape_html(&notebook::representation_text(value))
                );
            }
        }
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PageRenderer {
    fn render(
        &self,
        notebook: &Notebook,
        settings: &Notebook,
        config: &RenderConfig,
    ) -> impl Future<Output = Result<String>> + Send {
        async move { Ok(self.render_page(notebook, settings, config)) }
    }
}

/// JSON for embedding inside a `<script>` element. `<` is escaped so a
/// string containing `</script>` cannot terminate the block early.
fn json_for_script(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .replace('<', "\\u003c")
}
