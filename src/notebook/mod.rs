//! Notebook document model.
//!
//! A notebook is an ordered sequence of cells, each markdown, code, or raw
//! text. Code cells carry outputs which may expose the same result in
//! several MIME representations; exactly one is selected for display per
//! [`DISPLAY_PRIORITY`].
//!
//! Parsing is permissive: `source` accepts both the single-string and the
//! line-array form, absent `outputs`/`attachments` default to empty, and an
//! unrecognized `cell_type` degrades to raw instead of failing the document.

mod normalize;

pub use normalize::normalize;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// MIME type → representation, insertion order preserved.
pub type MimeBundle = Map<String, Value>;

/// Attachment key → { MIME type → base64 payload }.
pub type AttachmentMap = Map<String, Value>;

/// Display priority for MIME bundles. The first entry present in a bundle is
/// the one shown; the rest are retained but not displayed.
pub const DISPLAY_PRIORITY: &[&str] = &[
    "text/html",
    "image/svg+xml",
    "image/png",
    "image/jpeg",
    "image/gif",
    "text/markdown",
    "text/latex",
    "application/json",
    "text/plain",
];

/// A notebook document: an ordered sequence of cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Notebook {
    /// Parse a notebook from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Programming language declared in the notebook metadata, if any.
    pub fn language(&self) -> Option<&str> {
        self.metadata.get("language_info")?.get("name")?.as_str()
    }
}

/// A single notebook cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub cell_type: CellKind,
    #[serde(default)]
    pub source: SourceText,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Output>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attachments: AttachmentMap,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Cell {
    /// Create a markdown cell from source text.
    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellKind::Markdown,
            source: SourceText(source.into()),
            ..Self::default()
        }
    }

    /// Create a code cell from source text.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            cell_type: CellKind::Code,
            source: SourceText(source.into()),
            ..Self::default()
        }
    }
}

/// Cell variant tag.
///
/// Unknown tags degrade to [`CellKind::Raw`] so a malformed cell renders as
/// plain text instead of failing the whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellKind {
    Code,
    Markdown,
    #[default]
    Raw,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
        }
    }
}

impl From<String> for CellKind {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "code" => Self::Code,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Raw,
        }
    }
}

impl From<CellKind> for String {
    fn from(kind: CellKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell source text. The notebook format stores this either as one string or
/// as a list of lines; both forms deserialize to the joined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceText(pub String);

impl SourceText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for SourceText {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Lines(Vec<String>),
            Missing,
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(s) => SourceText(s),
            Repr::Lines(lines) => SourceText(lines.concat()),
            Repr::Missing => SourceText::default(),
        })
    }
}

impl std::fmt::Display for SourceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cell output, tagged by `output_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        #[serde(default)]
        name: String,
        #[serde(default)]
        text: SourceText,
    },
    DisplayData {
        #[serde(default)]
        data: MimeBundle,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        metadata: Map<String, Value>,
    },
    ExecuteResult {
        #[serde(default)]
        data: MimeBundle,
        #[serde(default)]
        execution_count: Option<i64>,
    },
    Error {
        #[serde(default)]
        ename: String,
        #[serde(default)]
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl Output {
    /// The MIME bundle for rich outputs, if this output carries one.
    pub fn bundle(&self) -> Option<&MimeBundle> {
        match self {
            Self::DisplayData { data, .. } | Self::ExecuteResult { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Total display order over a bundle's representations: priority-listed
/// types first (in priority order, only those present), then the remainder
/// in original insertion order.
pub fn ordered_mime_types(bundle: &MimeBundle) -> Vec<&str> {
    let mut ordered: Vec<&str> = DISPLAY_PRIORITY
        .iter()
        .copied()
        .filter(|mime| bundle.contains_key(*mime))
        .collect();
    for key in bundle.keys() {
        if !DISPLAY_PRIORITY.contains(&key.as_str()) {
            ordered.push(key);
        }
    }
    ordered
}

/// Pick the representation to display: the first priority-list entry present
/// in the bundle, falling back to insertion order among the remainder.
pub fn select_representation(bundle: &MimeBundle) -> Option<(&str, &Value)> {
    let mime = ordered_mime_types(bundle).into_iter().next()?;
    bundle.get(mime).map(|value| (mime, value))
}

/// Flatten a bundle representation to text. The notebook format stores text
/// either as one string or a list of lines; anything else round-trips
/// through its JSON rendering.
pub fn representation_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.as_str().to_string(),
                other => other.to_string(),
            })
            .collect(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_notebook() {
        let json = r##"{
            "nbformat": 4,
            "metadata": {"language_info": {"name": "python"}},
            "cells": [
                {
                    "cell_type": "markdown",
                    "metadata": {},
                    "source": ["# Hello\n", "world"]
                },
                {
                    "cell_type": "code",
                    "metadata": {},
                    "execution_count": 1,
                    "source": "print(1)",
                    "outputs": [
                        {"output_type": "stream", "name": "stdout", "text": ["1\n"]}
                    ]
                }
            ]
        }"##;

        let nb = Notebook::parse(json).expect("should parse");
        assert_eq!(nb.cells.len(), 2);
        assert_eq!(nb.cells[0].cell_type, CellKind::Markdown);
        assert_eq!(nb.cells[0].source.as_str(), "# Hello\nworld");
        assert_eq!(nb.cells[1].cell_type, CellKind::Code);
        assert_eq!(nb.cells[1].outputs.len(), 1);
    }

    #[test]
    fn test_malformed_cell_defaults() {
        // No source, no outputs, no attachments: everything defaults.
        let nb = Notebook::parse(r#"{"cells": [{"cell_type": "code"}]}"#).expect("should parse");
        assert_eq!(nb.cells[0].source.as_str(), "");
        assert!(nb.cells[0].outputs.is_empty());
        assert!(nb.cells[0].attachments.is_empty());
    }

    #[test]
    fn test_unknown_cell_type_degrades_to_raw() {
        let nb = Notebook::parse(r#"{"cells": [{"cell_type": "widget", "source": "x"}]}"#)
            .expect("should parse");
        assert_eq!(nb.cells[0].cell_type, CellKind::Raw);
    }

    #[test]
    fn test_execute_result_bundle() {
        let json = r#"{
            "cells": [{
                "cell_type": "code",
                "source": "2 + 2",
                "outputs": [{
                    "output_type": "execute_result",
                    "execution_count": 1,
                    "data": {"text/plain": "4"}
                }]
            }]
        }"#;

        let nb = Notebook::parse(json).expect("should parse");
        let bundle = nb.cells[0].outputs[0].bundle().expect("has bundle");
        let (mime, value) = select_representation(bundle).expect("has representation");
        assert_eq!(mime, "text/plain");
        assert_eq!(representation_text(value), "4");
    }

    #[test]
    fn test_selection_follows_priority() {
        let mut bundle = MimeBundle::new();
        bundle.insert("text/plain".to_string(), json!("a"));
        bundle.insert("text/html".to_string(), json!("b"));

        let (mime, value) = select_representation(&bundle).expect("has representation");
        assert_eq!(mime, "text/html");
        assert_eq!(representation_text(value), "b");
    }

    #[test]
    fn test_ordering_priority_then_insertion_order() {
        let mut bundle = MimeBundle::new();
        bundle.insert("application/x-custom".to_string(), json!("c"));
        bundle.insert("text/plain".to_string(), json!("a"));
        bundle.insert("application/x-other".to_string(), json!("o"));
        bundle.insert("text/html".to_string(), json!("b"));

        assert_eq!(
            ordered_mime_types(&bundle),
            vec![
                "text/html",
                "text/plain",
                "application/x-custom",
                "application/x-other"
            ]
        );
    }

    #[test]
    fn test_unlisted_types_fall_back_to_insertion_order() {
        let mut bundle = MimeBundle::new();
        bundle.insert("application/x-custom".to_string(), json!("c"));
        bundle.insert("application/x-other".to_string(), json!("o"));

        let (mime, _) = select_representation(&bundle).expect("has representation");
        assert_eq!(mime, "application/x-custom");
    }

    #[test]
    fn test_multiline_representation_text() {
        let value = json!(["line 1\n", "line 2"]);
        assert_eq!(representation_text(&value), "line 1\nline 2");
    }
}
