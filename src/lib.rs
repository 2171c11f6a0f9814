//! # cello
//!
//! A fast converter from notebook documents (ordered markdown and code
//! cells, Jupyter-style JSON) to single-file HTML with working in-page
//! navigation.
//!
//! ## Features
//!
//! - Deterministic, collision-resistant heading anchors
//! - A navigation tree mirroring the document's heading structure
//! - Binary attachments inlined as data URIs
//! - Document title derived from the first heading
//! - Syntax-highlighted code cells, markdown cells rendered to HTML
//!
//! ## Quick Start
//!
//! ```no_run
//! use cello::{Notebook, PageRenderer, RenderConfig, convert_notebook};
//!
//! # async fn run() -> cello::Result<()> {
//! let notebook = Notebook::parse(r#"{"cells": []}"#)?;
//! let renderer = PageRenderer::new();
//! let settings = Notebook::default();
//! let config = RenderConfig::default();
//!
//! let html = convert_notebook(&renderer, notebook, &settings, &config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! Conversion runs a fixed sequence of passes per document: normalize cell
//! outputs, render the raw page markup, parse it into a mutable tree,
//! resolve `attachment:` references, index headings into the navigation
//! tree, derive the title, and serialize. Documents are independent and may
//! be converted concurrently; see [`convert_file`].

pub mod convert;
pub mod dom;
pub mod error;
pub mod notebook;
pub mod render;

pub use convert::{convert_file, convert_file_to_string, convert_notebook};
pub use error::{Error, Result};
pub use notebook::{Cell, CellKind, Notebook, Output};
pub use render::{Orientation, PageRenderer, RenderConfig, Renderer};
