use pagesnap_core::Fragments;
use scraper::{Html, Selector};

/// Assemble the simplified document from extracted fragments.
///
/// Layout: `<head>{title?}{head}</head><body>{header?}{body}</body>`. Nothing
/// but the doctype line sits outside `<head>`/`<body>`: the HTML parser moves
/// stray whitespace after `</body>` back into the body, which would break
/// re-extraction. The title element is only synthesized when the head lacks
/// one, and the header is only prepended when the body does not already carry
/// it, so re-extracting the result yields the same fragments.
pub fn build_simplified_document(title: &str, fragments: &Fragments) -> String {
    let mut doc = String::with_capacity(
        64 + title.len() + fragments.head.len() + fragments.header.len() + fragments.body.len(),
    );
    doc.push_str("<!DOCTYPE html>\n<html><head>");
    if !head_has_title(&fragments.head) {
        doc.push_str("<title>");
        doc.push_str(&escape_text(title));
        doc.push_str("</title>");
    }
    doc.push_str(&fragments.head);
    doc.push_str("</head><body>");
    if !fragments.header.is_empty() && !fragments.body.contains(&fragments.header) {
        doc.push_str(&fragments.header);
    }
    doc.push_str(&fragments.body);
    doc.push_str("</body></html>");
    doc
}

fn head_has_title(head: &str) -> bool {
    if head.is_empty() {
        return false;
    }
    let doc = Html::parse_document(&format!("<html><head>{head}</head></html>"));
    let (Ok(head_sel), Ok(title_sel)) = (Selector::parse("head"), Selector::parse("title")) else {
        return false;
    };
    doc.select(&head_sel)
        .next()
        .is_some_and(|h| h.select(&title_sel).next().is_some())
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_escaped() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn detects_title_in_head_fragment() {
        assert!(head_has_title("<meta charset=\"utf-8\"><title>x</title>"));
        assert!(!head_has_title("<meta charset=\"utf-8\">"));
        assert!(!head_has_title(""));
    }
}
