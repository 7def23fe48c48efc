use crate::crawler::ProductFields;
use serde::{Deserialize, Serialize};

/// One extracted product, the unit of the output dataset
///
/// Every field except `page` may be missing; extraction is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub category: Option<String>,
    pub page: u32,
    pub image: Option<String>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub current_price: Option<String>,
    pub original_price: Option<String>,
    pub discount: Option<String>,
}

impl Record {
    /// Column names, in serialization order
    pub const COLUMNS: [&'static str; 8] = [
        "category",
        "page",
        "image",
        "name",
        "link",
        "current_price",
        "original_price",
        "discount",
    ];

    /// Combines extracted card fields with the page they were found on
    ///
    /// Empty strings are stored as missing, since no dataset format can tell
    /// an empty cell from an absent one once written.
    pub fn new(category: Option<String>, page: u32, fields: ProductFields) -> Self {
        Self {
            category: non_empty(category),
            page,
            image: non_empty(fields.image),
            name: non_empty(fields.name),
            link: non_empty(fields.link),
            current_price: non_empty(fields.current_price),
            original_price: non_empty(fields.original_price),
            discount: non_empty(fields.discount),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
