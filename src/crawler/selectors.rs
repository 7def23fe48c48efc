//! Compiled selector table
//!
//! Every selector the crawler uses comes from configuration and is parsed
//! once, up front. The extraction code only ever sees [`SelectorTable`].

use crate::config::{FieldSelector, SelectorConfig};
use crate::render::{Dom, ElementExt};
use crate::ConfigError;
use scraper::{ElementRef, Selector};

/// A parsed selector plus its optional fallback
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    primary: Selector,
    fallback: Option<Selector>,
}

impl CompiledSelector {
    fn compile(field: &str, config: &FieldSelector) -> Result<Self, ConfigError> {
        let primary = parse(field, &config.selector)?;
        let fallback = config
            .fallback
            .as_deref()
            .map(|css| parse(field, css))
            .transpose()?;
        Ok(Self { primary, fallback })
    }

    /// First match inside `scope`, trying the fallback if the primary finds nothing
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.find_element(&self.primary).or_else(|| {
            self.fallback
                .as_ref()
                .and_then(|fallback| scope.find_element(fallback))
        })
    }

    /// All matches inside `scope`; the fallback is used only if the primary finds nothing
    pub fn all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let found = scope.find_elements(&self.primary);
        match &self.fallback {
            Some(fallback) if found.is_empty() => scope.find_elements(fallback),
            _ => found,
        }
    }

    /// Like [`first`](Self::first), over a whole document
    pub fn first_in<'a>(&self, dom: &'a Dom) -> Option<ElementRef<'a>> {
        dom.find_element(&self.primary).or_else(|| {
            self.fallback
                .as_ref()
                .and_then(|fallback| dom.find_element(fallback))
        })
    }

    /// Like [`all`](Self::all), over a whole document
    pub fn all_in<'a>(&self, dom: &'a Dom) -> Vec<ElementRef<'a>> {
        let found = dom.find_elements(&self.primary);
        match &self.fallback {
            Some(fallback) if found.is_empty() => dom.find_elements(fallback),
            _ => found,
        }
    }
}

fn parse(field: &str, css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: format!("'{}': {:?}", css, e),
    })
}

/// Selectors for every field, ready for matching
#[derive(Debug, Clone)]
pub struct SelectorTable {
    pub category: CompiledSelector,
    pub pagination: CompiledSelector,
    pub item_card: CompiledSelector,
    pub image: CompiledSelector,
    pub image_src_attribute: String,
    pub image_srcset_attribute: String,
    pub name: CompiledSelector,
    pub link: CompiledSelector,
    pub current_price: CompiledSelector,
    pub original_price: CompiledSelector,
    pub discount: CompiledSelector,
}

impl SelectorTable {
    /// Parses every selector in the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorTable)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - Names the first field that failed
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            category: CompiledSelector::compile("category", &config.category)?,
            pagination: CompiledSelector::compile("pagination", &config.pagination)?,
            item_card: CompiledSelector::compile("item-card", &config.item_card)?,
            image: CompiledSelector::compile("image", &config.image)?,
            image_src_attribute: config.image_src_attribute.clone(),
            image_srcset_attribute: config.image_srcset_attribute.clone(),
            name: CompiledSelector::compile("name", &config.name)?,
            link: CompiledSelector::compile("link", &config.link)?,
            current_price: CompiledSelector::compile("current-price", &config.current_price)?,
            original_price: CompiledSelector::compile("original-price", &config.original_price)?,
            discount: CompiledSelector::compile("discount", &config.discount)?,
        })
    }
}
