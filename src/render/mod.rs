//! Rendering seams: the page renderer contract plus the markdown and
//! syntax-highlighting backends.
//!
//! The pipeline treats rendering as a black box: a [`Renderer`] takes the
//! notebook, the settings document, and a [`RenderConfig`] and produces raw
//! markup in one async-capable call. [`PageRenderer`] is the built-in
//! implementation. All rendering state is an explicitly-constructed value;
//! there is no process-wide template or filter registry.

pub mod highlight;
pub mod markdown;
mod page;

pub use highlight::Highlighter;
pub use page::PageRenderer;

use std::future::Future;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::notebook::Notebook;

/// Rendering backend contract: one call per render, async-capable.
pub trait Renderer {
    fn render(
        &self,
        notebook: &Notebook,
        settings: &Notebook,
        config: &RenderConfig,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Input/output layout of a rendered cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Source above outputs.
    #[default]
    InOut,
    /// Outputs above source.
    OutIn,
    /// Outputs only.
    NoSource,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InOut => "in-out",
            Self::OutIn => "out-in",
            Self::NoSource => "no-source",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "in-out" => Ok(Self::InOut),
            "out-in" => Ok(Self::OutIn),
            "no-source" => Ok(Self::NoSource),
            _ => Err(format!(
                "unknown orientation '{s}'. Expected: in-out, out-in, no-source"
            )),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render configuration. Recognized keys are typed fields; anything else
/// rides along in `extra` and is handed to the rendering backend verbatim.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Disable editing affordances.
    pub readonly: bool,
    /// Navigation tree starts expanded.
    pub navigation_expanded: bool,
    /// Input/output layout for code cells.
    pub orientation: Orientation,
    /// Title/headline used when the document has no headings.
    pub default_title: String,
    /// Unrecognized keys, passed through opaquely.
    pub extra: Map<String, Value>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            readonly: false,
            navigation_expanded: false,
            orientation: Orientation::default(),
            default_title: "Notebook".to_string(),
            extra: Map::new(),
        }
    }
}

impl RenderConfig {
    /// Flatten to JSON for embedding in the rendered page: pass-through keys
    /// first, recognized keys written last so they always win.
    pub fn to_json(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("readonly".to_string(), Value::Bool(self.readonly));
        map.insert(
            "navigation_expanded".to_string(),
            Value::Bool(self.navigation_expanded),
        );
        map.insert(
            "orientation".to_string(),
            Value::String(self.orientation.as_str().to_string()),
        );
        Value::Object(map)
    }
}

/// Escape text for HTML element and attribute contexts.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_round_trip() {
        for o in [Orientation::InOut, Orientation::OutIn, Orientation::NoSource] {
            assert_eq!(o.as_str().parse::<Orientation>().unwrap(), o);
        }
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_config_json_keeps_pass_through_keys() {
        let mut config = RenderConfig::default();
        config
            .extra
            .insert("theme".to_string(), Value::String("dark".to_string()));
        config.readonly = true;

        let json = config.to_json();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["readonly"], true);
        assert_eq!(json["orientation"], "in-out");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }
}
