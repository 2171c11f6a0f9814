//! Title derivation: the first heading anywhere in the rendered output
//! becomes the document title and the header headline.

use crate::dom::{Dom, NodeId};
use crate::error::Result;

/// Scan cell output containers in document order and stop at the first
/// heading of any level. Its text overwrites `<title>` and the header
/// headline wholesale; with no heading anywhere, both keep their rendered
/// defaults. Returns the derived title, if any.
pub fn derive(dom: &mut Dom) -> Result<Option<String>> {
    let Some(heading) = first_heading(dom)? else {
        return Ok(None);
    };

    let text = dom
        .text_content(heading)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(title) = dom.select_first("head title")? {
        dom.set_text(title, &text);
    }
    if let Some(headline) = dom.select_first("header h1")? {
        dom.set_text(headline, &text);
    }

    Ok(Some(text))
}

fn first_heading(dom: &Dom) -> Result<Option<NodeId>> {
    for container in dom.select("ol.cells > li.cell details.outputs")? {
        if let Some(&heading) = dom
            .select_in(container, "h1, h2, h3, h4, h5, h6")?
            .first()
        {
            return Ok(Some(heading));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn page(cells: &str) -> Dom {
        parse(&format!(
            "<html><head><title>Notebook</title></head><body>\
             <header><hgroup><h1>Notebook</h1></hgroup></header>\
             <ol class=\"cells\">{cells}</ol></body></html>"
        ))
    }

    #[test]
    fn test_first_heading_wins_regardless_of_level() {
        let mut dom = page(
            "<li class=\"cell\"><details class=\"outputs\"><h3>Overview</h3></details></li>\
             <li class=\"cell\"><details class=\"outputs\"><h1>Not me</h1></details></li>",
        );

        let derived = derive(&mut dom).unwrap();

        assert_eq!(derived.as_deref(), Some("Overview"));
        let title = dom.select_first("head title").unwrap().expect("title");
        assert_eq!(dom.text_content(title), "Overview");
        let headline = dom.select_first("header h1").unwrap().expect("headline");
        assert_eq!(dom.text_content(headline), "Overview");
    }

    #[test]
    fn test_no_heading_keeps_defaults() {
        let mut dom = page(
            "<li class=\"cell\"><details class=\"outputs\"><p>just text</p></details></li>",
        );

        let derived = derive(&mut dom).unwrap();

        assert!(derived.is_none());
        let title = dom.select_first("head title").unwrap().expect("title");
        assert_eq!(dom.text_content(title), "Notebook");
        let headline = dom.select_first("header h1").unwrap().expect("headline");
        assert_eq!(dom.text_content(headline), "Notebook");
    }

    #[test]
    fn test_header_headline_is_not_a_candidate() {
        // The header's own h1 is outside the cell list and must not feed
        // back into itself.
        let mut dom = page(
            "<li class=\"cell\"><details class=\"outputs\"><h2>Real</h2></details></li>",
        );

        let derived = derive(&mut dom).unwrap();
        assert_eq!(derived.as_deref(), Some("Real"));
    }
}
