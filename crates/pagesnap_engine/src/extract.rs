use pagesnap_core::{Fragments, TITLE_FALLBACK};
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub fragments: Fragments,
}

impl ExtractedPage {
    pub fn has_fallback_title(&self) -> bool {
        self.title == TITLE_FALLBACK
    }
}

/// Pulls named fragments out of a document. Implementations must not fail:
/// a missing region degrades to an empty string.
pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> ExtractedPage;
}

/// Structural extractor over an html5ever tree:
/// - `title`: trimmed text of the first `<title>`, else [`TITLE_FALLBACK`]
/// - `head`: inner markup of `<head>`
/// - `header`: outer markup of the first `<header>`
/// - `body`: inner markup of `<body>`
#[derive(Debug, Default)]
pub struct FragmentExtractor;

impl Extractor for FragmentExtractor {
    fn extract(&self, html: &str) -> ExtractedPage {
        let doc = Html::parse_document(html);

        let title = first(&doc, "title")
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| TITLE_FALLBACK.to_string());

        let fragments = Fragments {
            head: first(&doc, "head").map(|n| n.inner_html()).unwrap_or_default(),
            header: first(&doc, "header").map(|n| n.html()).unwrap_or_default(),
            body: first(&doc, "body").map(|n| n.inner_html()).unwrap_or_default(),
        };

        ExtractedPage { title, fragments }
    }
}

/// First live match; `<template>` contents are inert and never count.
fn first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).find(|el| !inside_template(el))
}

fn inside_template(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|ancestor| ancestor.name() == "template")
}
