//! Crawl driver - main crawl orchestration logic
//!
//! The coordinator owns everything a run touches:
//! - The renderer session, opened once and released at the end
//! - The in-memory record buffer, seeded from the existing dataset
//! - The progress store and the dataset sink
//! - The phase machine that orders navigation, extraction and persistence
//!
//! Every source is processed behind a guard: a failure is logged and the run
//! moves on to the next source. Once a source's first page has been read,
//! a page that fails to render is recorded with no items and the source
//! continues, so progress never covers a source with pages left unvisited.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::extract_fields;
use crate::crawler::pagination::{discover, PaginationMetadata};
use crate::crawler::selectors::SelectorTable;
use crate::output::{open_sink, DatasetSink, Record};
use crate::render::{build_renderer, Dom, NavigationOutcome, PageRenderer, RenderError};
use crate::sources::{distinct_sources, page_url, pending_sources};
use crate::state::CrawlPhase;
use crate::storage::{JsonProgressStore, ProgressStore};
use crate::HarvestError;
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct sources in the source list
    pub sources_total: usize,
    /// Sources skipped because progress already had them
    pub sources_skipped: usize,
    /// Sources whose every page was persisted
    pub sources_completed: usize,
    /// Sources abandoned after an error
    pub sources_failed: usize,
    /// Failed sources that already had progress recorded, so a later run skips them
    pub sources_partial: usize,
    /// Pages persisted in this run
    pub pages_processed: usize,
    /// Records extracted in this run
    pub records_harvested: usize,
    /// Navigations that hit the timeout
    pub navigation_timeouts: usize,
    /// Pages recorded with no items because rendering failed
    pub page_errors: usize,
}

/// Main crawl driver
pub struct Coordinator {
    crawler: CrawlerConfig,
    selectors: SelectorTable,
    renderer: Box<dyn PageRenderer>,
    sink: Box<dyn DatasetSink>,
    progress: Box<dyn ProgressStore>,
    records: Vec<Record>,
    phase: CrawlPhase,
    summary: RunSummary,
}

impl Coordinator {
    /// Creates a driver from configuration
    ///
    /// Opens the progress artifact (creating it if absent), the dataset sink
    /// and the renderer. Any of these failing is fatal for the run.
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Failed to initialize
    pub async fn new(config: &Config) -> Result<Self, HarvestError> {
        let selectors = SelectorTable::compile(&config.selectors)?;

        let progress = JsonProgressStore::open(Path::new(&config.output.progress_path));
        progress.ensure_exists()?;

        let sink = open_sink(&config.output)?;
        let renderer =
            build_renderer(&config.renderer, config.crawler.navigation_timeout()).await?;

        Ok(Self::with_parts(
            config.crawler.clone(),
            selectors,
            renderer,
            sink,
            Box::new(progress),
        ))
    }

    /// Creates a driver from already-built parts
    ///
    /// The record buffer starts with whatever the sink already holds, so
    /// rows from earlier runs survive the next rewrite.
    pub fn with_parts(
        crawler: CrawlerConfig,
        selectors: SelectorTable,
        renderer: Box<dyn PageRenderer>,
        sink: Box<dyn DatasetSink>,
        mut progress: Box<dyn ProgressStore>,
    ) -> Self {
        progress.load();

        let records = sink.load();
        if !records.is_empty() {
            tracing::info!(
                "Loaded {} existing records from {}",
                records.len(),
                sink.location()
            );
        }

        Self {
            crawler,
            selectors,
            renderer,
            sink,
            progress,
            records,
            phase: CrawlPhase::Idle,
            summary: RunSummary::default(),
        }
    }

    /// Records buffered so far, in dataset order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The progress store backing this run
    pub fn progress(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    /// Current phase of the driver
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl over `sources`
    ///
    /// Sources already in progress are filtered out once, before the first
    /// navigation. Duplicate sources are visited once. The renderer is
    /// released when the loop ends, whatever happened to the sources.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Every pending source was attempted
    /// * `Err(HarvestError)` - The phase machine was driven out of order
    pub async fn run(&mut self, sources: &[String]) -> Result<RunSummary, HarvestError> {
        let start_time = Instant::now();

        let distinct = distinct_sources(sources);
        let pending = pending_sources(&distinct, self.progress.as_ref());

        self.summary = RunSummary {
            sources_total: distinct.len(),
            sources_skipped: distinct.len() - pending.len(),
            ..RunSummary::default()
        };

        tracing::info!(
            "Starting crawl: {} sources pending, {} already harvested",
            pending.len(),
            self.summary.sources_skipped
        );

        for (index, source) in pending.iter().enumerate() {
            tracing::info!("Source {}/{}: {}", index + 1, pending.len(), source);

            match self.process_source(source).await {
                Ok(()) => self.summary.sources_completed += 1,
                Err(e) => {
                    tracing::error!("Error processing {}: {}", source, e);
                    self.summary.sources_failed += 1;
                    if self.progress.has(source) {
                        self.summary.sources_partial += 1;
                    }
                    self.phase = CrawlPhase::Idle;
                }
            }
        }

        let finish = self.transition(CrawlPhase::Done);
        self.renderer.close().await;
        finish?;

        let summary = self.summary.clone();
        tracing::info!(
            "Crawl completed in {:?}: {} sources completed, {} failed ({} partial), {} skipped, {} pages ({} errors), {} records",
            start_time.elapsed(),
            summary.sources_completed,
            summary.sources_failed,
            summary.sources_partial,
            summary.sources_skipped,
            summary.pages_processed,
            summary.page_errors,
            summary.records_harvested
        );

        Ok(summary)
    }

    /// Processes every page of one source
    async fn process_source(&mut self, source: &str) -> Result<(), HarvestError> {
        self.transition(CrawlPhase::SourceSelected)?;

        // Errors before any page is persisted abandon the whole source.
        let first_page = self.source_page_url(source, 1)?;
        self.load_page(&first_page).await?;
        let PaginationMetadata {
            category,
            total_pages,
        } = discover(&self.renderer.snapshot().await?, &self.selectors);

        tracing::info!(
            "Found {} pages for category {}",
            total_pages,
            category.as_deref().unwrap_or("<none>")
        );

        let mut source_records: u64 = 0;

        for page in 1..=total_pages {
            let url = self.source_page_url(source, page)?;

            self.transition(CrawlPhase::PageLoading)?;
            let dom = match self.render_page(&url).await {
                Ok(dom) => dom,
                Err(e) => {
                    tracing::warn!(
                        "Page {}/{} of {} failed to render ({}); recording it with no items",
                        page,
                        total_pages,
                        source,
                        e
                    );
                    self.summary.page_errors += 1;
                    Dom::empty()
                }
            };
            self.transition(CrawlPhase::PageRendered)?;

            let page_records = self.extract_page(&dom, &url, category.as_deref(), page);
            self.transition(CrawlPhase::ItemsExtracted)?;

            tracing::info!(
                "Page {}/{}: {} items from {}",
                page,
                total_pages,
                page_records.len(),
                url
            );

            source_records += page_records.len() as u64;
            self.persist_page(source, page_records, source_records)?;
            self.transition(CrawlPhase::Persisted)?;

            self.summary.pages_processed += 1;
        }

        tracing::info!("Finished {} with {} records", source, source_records);
        Ok(())
    }

    /// Loads, scrolls and snapshots one page
    async fn render_page(&mut self, url: &Url) -> Result<Dom, RenderError> {
        self.load_page(url).await?;
        self.renderer.scroll_to_bottom().await?;
        tokio::time::sleep(self.crawler.scroll_delay()).await;
        self.renderer.snapshot().await
    }

    /// Navigates to `url`, stopping the load on timeout, then waits for the page to settle
    async fn load_page(&mut self, url: &Url) -> Result<(), RenderError> {
        let outcome = self
            .renderer
            .navigate(url, self.crawler.navigation_timeout())
            .await?;

        if outcome == NavigationOutcome::TimedOut {
            tracing::warn!(
                "Navigation to {} timed out after {:?}; using the partially loaded page",
                url,
                self.crawler.navigation_timeout()
            );
            self.summary.navigation_timeouts += 1;
            self.renderer.stop_loading().await;
        }

        tokio::time::sleep(self.crawler.settle_delay()).await;
        Ok(())
    }

    /// Turns every item card on the page into a record
    fn extract_page(&self, dom: &Dom, url: &Url, category: Option<&str>, page: u32) -> Vec<Record> {
        self.selectors
            .item_card
            .all_in(dom)
            .into_iter()
            .map(|card| {
                Record::new(
                    category.map(str::to_string),
                    page,
                    extract_fields(card, &self.selectors, url),
                )
            })
            .collect()
    }

    /// Rewrites the dataset with the whole buffer, then records progress
    ///
    /// If the dataset write fails the page's records are dropped from the
    /// buffer again, so buffer and artifact never diverge.
    fn persist_page(
        &mut self,
        source: &str,
        page_records: Vec<Record>,
        source_records: u64,
    ) -> Result<(), HarvestError> {
        let mark = self.records.len();
        let added = page_records.len();
        self.records.extend(page_records);

        if let Err(e) = self.sink.write_all(&self.records) {
            self.records.truncate(mark);
            return Err(e.into());
        }
        self.summary.records_harvested += added;

        self.progress.record_count(source, source_records);
        self.progress.persist()?;

        tracing::debug!(
            "Persisted {} records to {}; {} has {}",
            self.records.len(),
            self.sink.location(),
            source,
            source_records
        );
        Ok(())
    }

    fn source_page_url(&self, source: &str, page: u32) -> Result<Url, HarvestError> {
        page_url(source, page).map_err(|e| HarvestError::InvalidSource {
            source_url: source.to_string(),
            message: e.to_string(),
        })
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}
