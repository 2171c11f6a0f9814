//! Attachment resolution: inline `attachment:` references as data URIs.
//!
//! Every cell's attachment map is merged into one table, later cells
//! overwriting earlier ones on key collision. Image nodes whose `src` uses
//! the `attachment:` pseudo-scheme are rewritten in place to self-contained
//! data URIs; a reference with no matching attachment is left untouched so a
//! partially-resolved document still renders.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;

use crate::dom::Dom;
use crate::error::Result;
use crate::notebook::{AttachmentMap, Notebook};

const SCHEME: &str = "attachment:";

/// Rewrite `attachment:` image references in the tree.
pub fn resolve(dom: &mut Dom, notebook: &Notebook) -> Result<()> {
    let table = merge_attachments(notebook);

    for img in dom.select(r#"img[src^="attachment:"]"#)? {
        let Some(src) = dom.attr(img, "src") else {
            continue;
        };
        let key = percent_decode_str(&src[SCHEME.len()..])
            .decode_utf8_lossy()
            .into_owned();

        match lookup(&table, &key) {
            Some((mime, payload)) => {
                let uri = format!("data:{mime};base64,{payload}");
                dom.set_attr(img, "src", &uri);
                dom.add_class(img, "attachment");
            }
            None => {
                tracing::debug!(key, "unresolved attachment reference left as-is");
            }
        }
    }
    Ok(())
}

/// Merge per-cell attachment maps in document order; on key collision the
/// later cell wins.
fn merge_attachments(notebook: &Notebook) -> AttachmentMap {
    let mut table = AttachmentMap::new();
    for cell in &notebook.cells {
        for (key, value) in &cell.attachments {
            table.insert(key.clone(), value.clone());
        }
    }
    table
}

/// Look up an attachment by key, returning its declared MIME type and a
/// canonical base64 payload. The stored payload may carry line breaks; it is
/// decoded (which also validates it) and re-encoded without them. A payload
/// that is not valid base64 resolves to `None`, leaving the reference
/// untouched like a missing key.
fn lookup(table: &AttachmentMap, key: &str) -> Option<(String, String)> {
    let bundle = table.get(key)?.as_object()?;
    let (mime, payload) = bundle.iter().next()?;
    let compact: String = payload.as_str()?.split_whitespace().collect();
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    Some((mime.clone(), STANDARD.encode(bytes)))
}
