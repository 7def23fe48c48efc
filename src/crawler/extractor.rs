//! Product card field extraction
//!
//! Each field has its own rule, `card -> Option<String>`, and the rules run
//! independently: a card with no price still yields its name and link.
//!
//! # Field Rules
//!
//! | Field | Rule |
//! |-------|------|
//! | image | `src`, unless missing or a placeholder; then the last `srcset` candidate |
//! | name | text of the title element |
//! | link | `href` of the product anchor, resolved against the page URL |
//! | current_price | text of the price element |
//! | original_price | text of the struck-through price element |
//! | discount | text of the first candidate whose own text contains `-` |
//!
//! The discount rule is deliberately loose. It also matches date-like or other
//! hyphenated text that happens to sit in a candidate element.

use crate::crawler::selectors::{CompiledSelector, SelectorTable};
use crate::render::ElementExt;
use scraper::ElementRef;
use url::Url;

/// Fields read from one product card
///
/// `category` and `page` are added by the driver when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub image: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub current_price: Option<String>,
    pub original_price: Option<String>,
    pub discount: Option<String>,
}

/// Extracts every field of a product card
///
/// # Arguments
///
/// * `card` - The product card element
/// * `selectors` - The compiled selector table
/// * `page_url` - URL of the page the card is on, for resolving links
pub fn extract_fields(card: ElementRef<'_>, selectors: &SelectorTable, page_url: &Url) -> ProductFields {
    ProductFields {
        image: extract_image(card, selectors),
        name: extract_text(card, &selectors.name),
        link: extract_link(card, &selectors.link, page_url),
        current_price: extract_text(card, &selectors.current_price),
        original_price: extract_text(card, &selectors.original_price),
        discount: extract_discount(card, &selectors.discount),
    }
}

/// Trimmed text of the first element matching `selector`
pub fn extract_text(card: ElementRef<'_>, selector: &CompiledSelector) -> Option<String> {
    selector.first(card).map(|element| element.text_content())
}

/// Absolute product URL
pub fn extract_link(card: ElementRef<'_>, selector: &CompiledSelector, page_url: &Url) -> Option<String> {
    let href = selector.first(card)?.attribute("href")?.trim();
    if href.is_empty() {
        return None;
    }
    page_url.join(href).ok().map(|url| url.to_string())
}

/// Product image URL, falling back to the source set for lazy-loaded images
pub fn extract_image(card: ElementRef<'_>, selectors: &SelectorTable) -> Option<String> {
    let image = selectors.image.first(card)?;

    let src = image
        .attribute(&selectors.image_src_attribute)
        .map(str::trim)
        .filter(|src| !src.is_empty());

    let chosen = match src {
        Some(src) if !is_placeholder(src) => Some(src),
        _ => image
            .attribute(&selectors.image_srcset_attribute)
            .and_then(last_srcset_candidate)
            .or(src),
    };

    chosen.map(normalize_schema_relative)
}

/// Text of the first candidate element whose first direct text node contains a hyphen
pub fn extract_discount(card: ElementRef<'_>, selector: &CompiledSelector) -> Option<String> {
    selector
        .all(card)
        .into_iter()
        .find(|element| element.own_text().contains('-'))
        .map(|element| element.text_content())
}

fn is_placeholder(src: &str) -> bool {
    src.to_ascii_lowercase().contains("placeholder")
}

/// URL of the last candidate in a `srcset` value, without its descriptor
///
/// ```
/// use catalog_harvest::crawler::last_srcset_candidate;
///
/// assert_eq!(last_srcset_candidate("a.jpg 100w, b.jpg 300w"), Some("b.jpg"));
/// assert_eq!(last_srcset_candidate(""), None);
/// ```
pub fn last_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .last()?
        .split_whitespace()
        .next()
}

/// Turns a schema-relative `//host/path` URL into an `https:` one
pub fn normalize_schema_relative(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
