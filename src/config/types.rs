use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
///
/// Every section is optional; a missing section falls back to the defaults below, which
/// match the Shopify "grid-product" collection theme.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    pub selectors: SelectorConfig,
}

/// Where the list of catalog URLs is read from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Newline-delimited list of collection URLs
    #[serde(rename = "sources-path")]
    pub sources_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sources_path: "urls.txt".to_string(),
        }
    }
}

/// Output artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON progress file
    #[serde(rename = "progress-path")]
    pub progress_path: String,

    /// Path to the dataset file
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    /// Dataset file format
    pub format: DatasetFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            progress_path: "progress.json".to_string(),
            dataset_path: "products.csv".to_string(),
            format: DatasetFormat::Csv,
        }
    }
}

/// Supported dataset formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Sqlite,
    Xlsx,
}

/// Crawl timing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Upper bound on a single page navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Wait after navigation before touching the DOM (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Wait after scrolling to the bottom of the page (milliseconds)
    #[serde(rename = "scroll-delay-ms")]
    pub scroll_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 180_000,
            settle_delay_ms: 3_000,
            scroll_delay_ms: 2_000,
        }
    }
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

/// Page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub kind: RendererKind,

    /// Base URL of the rendering service (browserless only)
    pub endpoint: Option<String>,

    /// API token for the rendering service
    pub token: Option<String>,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Chrome/Chromium binary (chrome only); found on the system when unset
    pub executable: Option<String>,

    /// Run Chrome without a window (chrome only)
    pub headless: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::Http,
            endpoint: None,
            token: None,
            user_agent: concat!("catalog-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
            executable: None,
            headless: true,
        }
    }
}

/// How pages are turned into DOM snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain GET of the page HTML
    Http,
    /// Fully rendered HTML from a Browserless `/content` endpoint
    Browserless,
    /// A local Chrome driven over the DevTools protocol
    Chrome,
}

/// A CSS selector with an optional second choice
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSelector {
    pub selector: String,

    /// Tried when `selector` matches nothing
    #[serde(default)]
    pub fallback: Option<String>,
}

impl FieldSelector {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            fallback: None,
        }
    }
}

/// Selector table for every field the crawler reads
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Collection heading, read from page 1
    pub category: FieldSelector,

    /// Numbered pagination anchors
    pub pagination: FieldSelector,

    /// One product card
    #[serde(rename = "item-card")]
    pub item_card: FieldSelector,

    pub image: FieldSelector,

    #[serde(rename = "image-src-attribute")]
    pub image_src_attribute: String,

    #[serde(rename = "image-srcset-attribute")]
    pub image_srcset_attribute: String,

    pub name: FieldSelector,
    pub link: FieldSelector,

    #[serde(rename = "current-price")]
    pub current_price: FieldSelector,

    #[serde(rename = "original-price")]
    pub original_price: FieldSelector,

    /// Candidates for the discount badge; the first whose own text has a hyphen wins
    pub discount: FieldSelector,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category: FieldSelector::new("h1.section-header__title"),
            pagination: FieldSelector::new("div.pagination span.page a"),
            item_card: FieldSelector::new("div.grid-product__content"),
            image: FieldSelector::new("img.grid__image-contain"),
            image_src_attribute: "src".to_string(),
            image_srcset_attribute: "data-srcset".to_string(),
            name: FieldSelector::new("div.grid-product__title"),
            link: FieldSelector::new("a.grid-product__link"),
            current_price: FieldSelector::new("span.grid-product__price"),
            original_price: FieldSelector::new("span.grid-product__price--original"),
            discount: FieldSelector::new("span"),
        }
    }
}
