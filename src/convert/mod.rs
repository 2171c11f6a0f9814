//! Document assembly: the fixed-order conversion pipeline.
//!
//! Each document is converted by one owner running the passes in a fixed
//! order: normalize cells, render the page markup, parse it into a tree,
//! resolve attachments, index headings, derive the title, serialize. The
//! passes depend on each other's tree mutations and are never reordered.
//! Documents are independent units of work and may be converted
//! concurrently against one shared read-only settings document.

pub mod attachments;
pub mod headings;
mod slug;
pub mod title;

pub use headings::NavEntry;
pub use slug::{AnchorRegistry, slugify};

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::dom;
use crate::error::{Error, Result};
use crate::notebook::{self, Notebook};
use crate::render::{RenderConfig, Renderer, markdown};

/// Convert an in-memory notebook to finished HTML.
pub async fn convert_notebook<R: Renderer>(
    renderer: &R,
    mut notebook: Notebook,
    settings: &Notebook,
    config: &RenderConfig,
) -> Result<String> {
    notebook::normalize(&mut notebook, markdown::to_html);

    let markup = renderer.render(&notebook, settings, config).await?;
    let mut dom = dom::parse(&markup);

    attachments::resolve(&mut dom, &notebook)?;

    let mut registry = AnchorRegistry::new();
    let entries = headings::index(&mut dom, &mut registry)?;
    tracing::debug!(headings = entries.len(), "indexed headings");

    let derived = title::derive(&mut dom)?;
    tracing::debug!(title = derived.as_deref(), "derived title");

    Ok(dom.serialize())
}

/// Read a notebook from disk and convert it, returning the finished HTML.
///
/// Failures carry the input path so batch output can locate the offending
/// document.
pub async fn convert_file_to_string<R: Renderer>(
    renderer: &R,
    input: &Path,
    settings: &Notebook,
    config: &RenderConfig,
) -> Result<String> {
    let json = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| Error::from(e).for_document(input))?;
    let notebook = Notebook::parse(&json).map_err(|e| e.for_document(input))?;
    convert_notebook(renderer, notebook, settings, config)
        .await
        .map_err(|e| e.for_document(input))
}

/// Convert a notebook file to an HTML file.
///
/// The output path is the input path (or `out_dir` joined with the input's
/// file name) with the extension replaced by `.html`. The file is written
/// through a temporary file in the target directory and persisted into
/// place only on full success, so a failed conversion never leaves a
/// partial output. Returns the absolute path of the written file.
pub async fn convert_file<R: Renderer>(
    renderer: &R,
    input: &Path,
    out_dir: Option<&Path>,
    settings: &Notebook,
    config: &RenderConfig,
) -> Result<PathBuf> {
    let html = convert_file_to_string(renderer, input, settings, config).await?;
    let output = output_path(input, out_dir);
    write_atomic(&output, &html).map_err(|e| e.for_document(input))?;
    Ok(std::path::absolute(&output)?)
}

fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file = input.with_extension("html");
    match (out_dir, file.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file,
    }
}

fn write_atomic(output: &Path, contents: &str) -> Result<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(output).map_err(|e| Error::from(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("docs/index.ipynb"), None),
            PathBuf::from("docs/index.html")
        );
    }

    #[test]
    fn test_output_path_honors_out_dir() {
        assert_eq!(
            output_path(Path::new("docs/index.ipynb"), Some(Path::new("out"))),
            PathBuf::from("out/index.html")
        );
    }
}
