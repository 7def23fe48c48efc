/// Crawl phase definitions for the crawl driver
///
/// This module defines the phases the driver moves through for every source and page.
use std::fmt;

/// Represents where the crawl driver currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No source selected yet, or the previous source was abandoned
    Idle,

    /// A pending source was picked and its first page is being read for pagination
    SourceSelected,

    /// The renderer is navigating to a collection page
    PageLoading,

    /// The page settled and was scrolled; the DOM is ready to read
    PageRendered,

    /// Item cards on the page were turned into records
    ItemsExtracted,

    /// The dataset and progress artifacts reflect the page
    Persisted,

    /// Every pending source has been handled
    Done,
}

impl CrawlPhase {
    /// Returns true if the driver may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, SourceSelected)
                | (Idle, Done)
                | (SourceSelected, PageLoading)
                | (PageLoading, PageRendered)
                | (PageRendered, ItemsExtracted)
                | (ItemsExtracted, Persisted)
                | (Persisted, PageLoading)
                | (Persisted, SourceSelected)
                | (Persisted, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SourceSelected => "source_selected",
            Self::PageLoading => "page_loading",
            Self::PageRendered => "page_rendered",
            Self::ItemsExtracted => "items_extracted",
            Self::Persisted => "persisted",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
