//! Syntax highlighting seam over syntect.
//!
//! Produces class-annotated spans (no inline colors); styling is left to the
//! page stylesheet. An unknown language name is an explicit `None` from the
//! syntax lookup, and the caller of that lookup falls back to escaped plain
//! text. Highlighting never fails a render.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::escape_html;

/// Syntax highlighter with a fixed syntax set, built once per renderer and
/// shared read-only across renders.
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Look up a syntax by language name or file extension.
    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        self.syntaxes.find_syntax_by_token(language)
    }

    /// Highlight `code` as `language`, returning an HTML fragment of
    /// class-annotated spans. Unknown languages render as escaped plain
    /// text.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let Some(syntax) = self.find_syntax(language) else {
            tracing::debug!(language, "unknown language, falling back to plain text");
            return escape_html(code);
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            if generator
                .parse_html_for_line_which_includes_newline(line)
                .is_err()
            {
                return escape_html(code);
            }
        }
        generator.finalize()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
