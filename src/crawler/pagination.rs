//! Pagination discovery
//!
//! Reads the category heading and the page count from a source's first page.

use crate::crawler::selectors::SelectorTable;
use crate::render::{Dom, ElementExt};

/// What the first page of a source says about the whole source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationMetadata {
    /// Text of the category heading, if the page has one
    pub category: Option<String>,
    /// Number of pages to visit, always at least 1
    pub total_pages: u32,
}

/// Discovers the category and page count from a rendered first page
///
/// Pages with no pagination control, or only non-numeric labels, have one page.
pub fn discover(dom: &Dom, selectors: &SelectorTable) -> PaginationMetadata {
    let category = selectors
        .category
        .first_in(dom)
        .map(|heading| heading.text_content());

    let labels = selectors
        .pagination
        .all_in(dom)
        .into_iter()
        .map(|anchor| anchor.text_content());

    PaginationMetadata {
        category,
        total_pages: max_page(labels),
    }
}

/// Parses a pagination label as a page number
///
/// Only labels made entirely of ASCII digits count; "next", "…" and "1-3" do not.
pub fn parse_page_label(label: &str) -> Option<u32> {
    let label = label.trim();
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    label.parse().ok().filter(|page| *page > 0)
}

/// Largest numeric page label, or 1 when there is none
pub fn max_page<I, S>(labels: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| parse_page_label(label.as_ref()))
        .max()
        .unwrap_or(1)
}
