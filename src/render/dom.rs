//! DOM snapshots
//!
//! A [`Dom`] is an immutable parse of the page as the renderer saw it.
//! Lookups return `Option`/`Vec`; a missing element is never an error.

use scraper::{ElementRef, Html, Selector};

/// Parsed snapshot of a rendered page
#[derive(Debug)]
pub struct Dom {
    html: Html,
}

impl Dom {
    /// Parses a full HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// A document with no content, used when nothing has loaded
    pub fn empty() -> Self {
        Self::parse("")
    }

    /// First element matching `selector`, in document order
    pub fn find_element(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// Every element matching `selector`, in document order
    pub fn find_elements(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.html.select(selector).collect()
    }
}

/// Element operations used by the extractors
pub trait ElementExt<'a> {
    /// First descendant matching `selector`
    fn find_element(&self, selector: &Selector) -> Option<ElementRef<'a>>;

    /// Every descendant matching `selector`
    fn find_elements(&self, selector: &Selector) -> Vec<ElementRef<'a>>;

    /// Visible text: all descendant text with whitespace runs collapsed and trimmed
    fn text_content(&self) -> String;

    /// The first direct text child, or an empty string if there is none
    fn own_text(&self) -> String;

    /// Attribute value, if present
    fn attribute(&self, name: &str) -> Option<&'a str>;
}

impl<'a> ElementExt<'a> for ElementRef<'a> {
    fn find_element(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }

    fn find_elements(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.select(selector).collect()
    }

    fn text_content(&self) -> String {
        let raw: String = self.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn own_text(&self) -> String {
        self.children()
            .find_map(|child| child.value().as_text())
            .map(|text| text.to_string())
            .unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }
}
