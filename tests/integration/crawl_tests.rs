//! Integration tests for the crawler
//!
//! These tests use wiremock to serve catalog pages to the real HTTP renderer,
//! and a scripted in-process renderer to observe what the artifacts hold
//! between pages.

use async_trait::async_trait;
use catalog_harvest::config::{
    Config, CrawlerConfig, DatasetFormat, RendererKind, SelectorConfig,
};
use catalog_harvest::crawler::{crawl, Coordinator, SelectorTable};
use catalog_harvest::output::{CsvSink, DatasetSink, SqliteSink, XlsxSink};
use catalog_harvest::render::{Dom, NavigationOutcome, PageRenderer, RenderError};
use catalog_harvest::storage::{JsonProgressStore, ProgressStore};
use catalog_harvest::{HarvestError, SourceError};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a collection page with pagination links and the given product cards
fn catalog_page(category: &str, total_pages: u32, products: &[(&str, &str)]) -> String {
    let pagination: String = (1..=total_pages)
        .map(|page| format!(r#"<span class="page"><a href="?page={0}">{0}</a></span>"#, page))
        .collect();

    let cards: String = products
        .iter()
        .map(|(name, price)| {
            let slug = name.to_lowercase().replace(' ', "-");
            format!(
                r#"<div class="grid-product__content">
                    <a class="grid-product__link" href="/products/{slug}">
                        <img class="grid__image-contain" src="//cdn.test/{slug}.jpg">
                        <div class="grid-product__title">{name}</div>
                    </a>
                    <span class="grid-product__price">{price}</span>
                </div>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
            <h1 class="section-header__title">{category}</h1>
            {cards}
            <div class="pagination">{pagination}<span class="page"><a href="?page=2">Next</a></span></div>
        </body></html>"#
    )
}

/// Creates a test configuration with every artifact inside `dir`
fn create_test_config(dir: &Path, sources: &[String]) -> Config {
    let sources_path = dir.join("urls.txt");
    std::fs::write(&sources_path, sources.join("\n")).unwrap();

    let mut config = Config::default();
    config.input.sources_path = sources_path.display().to_string();
    config.output.progress_path = dir.join("progress.json").display().to_string();
    config.output.dataset_path = dir.join("products.csv").display().to_string();
    config.crawler = CrawlerConfig {
        navigation_timeout_ms: 5_000,
        settle_delay_ms: 0,
        scroll_delay_ms: 0,
    };
    config
}

fn read_progress(path: &str) -> BTreeMap<String, u64> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

async fn mount_page(server: &MockServer, collection: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/collections/{}", collection)))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_writes_dataset_and_progress() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "shoes",
        1,
        catalog_page("Shoes", 2, &[("Trail Runner", "$96.00"), ("Court Classic", "$70.00")]),
    )
    .await;
    mount_page(&server, "shoes", 2, catalog_page("Shoes", 2, &[("Slip On", "$40.00")])).await;
    mount_page(&server, "hats", 1, catalog_page("Hats", 0, &[("Cap", "$15.00")])).await;

    let shoes = format!("{}/collections/shoes", server.uri());
    let hats = format!("{}/collections/hats", server.uri());
    let config = create_test_config(dir.path(), &[shoes.clone(), hats.clone()]);

    let summary = crawl(&config).await.unwrap();

    assert_eq!(summary.sources_completed, 2);
    assert_eq!(summary.sources_failed, 0);
    assert_eq!(summary.pages_processed, 3);
    assert_eq!(summary.records_harvested, 4);

    let records = CsvSink::new(Path::new(&config.output.dataset_path)).load();
    let rows: Vec<(&str, u32, &str)> = records
        .iter()
        .map(|r| {
            (
                r.category.as_deref().unwrap(),
                r.page,
                r.name.as_deref().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Shoes", 1, "Trail Runner"),
            ("Shoes", 1, "Court Classic"),
            ("Shoes", 2, "Slip On"),
            ("Hats", 1, "Cap"),
        ]
    );

    let first = &records[0];
    assert_eq!(first.image.as_deref(), Some("https://cdn.test/trail-runner.jpg"));
    assert_eq!(
        first.link.as_deref(),
        Some(format!("{}/products/trail-runner", server.uri()).as_str())
    );
    assert_eq!(first.current_price.as_deref(), Some("$96.00"));
    assert_eq!(first.original_price, None);

    let progress = read_progress(&config.output.progress_path);
    assert_eq!(progress.get(&shoes), Some(&3));
    assert_eq!(progress.get(&hats), Some(&1));
}

#[tokio::test]
async fn test_sqlite_dataset() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "hats",
        1,
        catalog_page("Hats", 1, &[("Cap", "$15.00"), ("Beanie", "$12.00")]),
    )
    .await;

    let hats = format!("{}/collections/hats", server.uri());
    let mut config = create_test_config(dir.path(), &[hats]);
    config.output.dataset_path = dir.path().join("products.db").display().to_string();
    config.output.format = DatasetFormat::Sqlite;

    crawl(&config).await.unwrap();

    let sink = SqliteSink::new(Path::new(&config.output.dataset_path)).unwrap();
    let names: Vec<String> = sink.load().into_iter().filter_map(|r| r.name).collect();
    assert_eq!(names, vec!["Cap", "Beanie"]);
}

#[tokio::test]
async fn test_xlsx_dataset_resumes_across_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "hats", 1, catalog_page("Hats", 1, &[("Cap", "$15.00")])).await;
    mount_page(&server, "bags", 1, catalog_page("Bags", 1, &[("Tote", "$60.00")])).await;

    let hats = format!("{}/collections/hats", server.uri());
    let bags = format!("{}/collections/bags", server.uri());

    let mut config = create_test_config(dir.path(), &[hats.clone()]);
    config.output.dataset_path = dir.path().join("products.xlsx").display().to_string();
    config.output.format = DatasetFormat::Xlsx;
    crawl(&config).await.unwrap();

    std::fs::write(&config.input.sources_path, format!("{}\n{}", hats, bags)).unwrap();
    let summary = crawl(&config).await.unwrap();
    assert_eq!(summary.sources_skipped, 1);

    let sink = XlsxSink::new(Path::new(&config.output.dataset_path));
    let names: Vec<String> = sink.load().into_iter().filter_map(|r| r.name).collect();
    assert_eq!(names, vec!["Cap", "Tote"]);
}

#[tokio::test]
async fn test_harvested_source_is_never_requested() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let shoes = format!("{}/collections/shoes", server.uri());
    let hats = format!("{}/collections/hats", server.uri());

    Mock::given(method("GET"))
        .and(path("/collections/shoes"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page("Shoes", 1, &[])))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "hats", 1, catalog_page("Hats", 1, &[("Cap", "$15.00")])).await;

    let config = create_test_config(dir.path(), &[shoes.clone(), hats.clone()]);
    std::fs::write(
        &config.output.progress_path,
        format!(r#"{{"{}": 12}}"#, shoes),
    )
    .unwrap();

    let summary = crawl(&config).await.unwrap();

    assert_eq!(summary.sources_skipped, 1);
    assert_eq!(summary.sources_completed, 1);

    let progress = read_progress(&config.output.progress_path);
    assert_eq!(progress.get(&shoes), Some(&12));
    assert_eq!(progress.get(&hats), Some(&1));
}

#[tokio::test]
async fn test_navigation_timeout_continues_with_partial_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/collections/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page("Slow", 3, &[("Late", "$1.00")]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "hats", 1, catalog_page("Hats", 1, &[("Cap", "$15.00")])).await;

    let slow = format!("{}/collections/slow", server.uri());
    let hats = format!("{}/collections/hats", server.uri());
    let mut config = create_test_config(dir.path(), &[slow.clone(), hats.clone()]);
    config.crawler.navigation_timeout_ms = 100;

    let summary = crawl(&config).await.unwrap();

    // Nothing arrived in time, so the slow source is a single empty page
    assert_eq!(summary.navigation_timeouts, 2);
    assert_eq!(summary.sources_completed, 2);

    let progress = read_progress(&config.output.progress_path);
    assert_eq!(progress.get(&slow), Some(&0));
    assert_eq!(progress.get(&hats), Some(&1));
}

#[tokio::test]
async fn test_failed_source_does_not_stop_the_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/collections/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "hats", 1, catalog_page("Hats", 1, &[("Cap", "$15.00")])).await;

    let gone = format!("{}/collections/gone", server.uri());
    let hats = format!("{}/collections/hats", server.uri());
    let config = create_test_config(dir.path(), &[gone.clone(), hats.clone()]);

    let summary = crawl(&config).await.unwrap();

    assert_eq!(summary.sources_failed, 1);
    assert_eq!(summary.sources_completed, 1);

    let progress = read_progress(&config.output.progress_path);
    assert!(!progress.contains_key(&gone));
    assert_eq!(progress.get(&hats), Some(&1));
}

#[tokio::test]
async fn test_server_error_mid_source_moves_to_next_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "boots", 1, catalog_page("Boots", 3, &[("Chelsea", "$90.00")])).await;
    Mock::given(method("GET"))
        .and(path("/collections/boots"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/boots"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page("Boots", 3, &[("Hiker", "$120.00")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let boots = format!("{}/collections/boots", server.uri());
    let config = create_test_config(dir.path(), &[boots.clone()]);

    let summary = crawl(&config).await.unwrap();

    assert_eq!(summary.sources_completed, 1);
    assert_eq!(summary.sources_failed, 0);
    assert_eq!(summary.page_errors, 1);
    assert_eq!(summary.pages_processed, 3);

    let records = CsvSink::new(Path::new(&config.output.dataset_path)).load();
    let rows: Vec<(u32, &str)> = records
        .iter()
        .map(|r| (r.page, r.name.as_deref().unwrap()))
        .collect();
    assert_eq!(rows, vec![(1, "Chelsea"), (3, "Hiker")]);

    let progress = read_progress(&config.output.progress_path);
    assert_eq!(progress.get(&boots), Some(&2));
}

#[tokio::test]
async fn test_browserless_renders_through_content_endpoint() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let hats = "https://shop.test/collections/hats".to_string();
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "s3cret"))
        .and(body_json(
            serde_json::json!({ "url": "https://shop.test/collections/hats?page=1" }),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page("Hats", 1, &[("Cap", "$15.00")])),
        )
        // pagination discovery, then page 1
        .expect(2)
        .mount(&server)
        .await;

    let mut config = create_test_config(dir.path(), &[hats.clone()]);
    config.renderer.kind = RendererKind::Browserless;
    config.renderer.endpoint = Some(server.uri());
    config.renderer.token = Some("s3cret".to_string());

    let summary = crawl(&config).await.unwrap();
    assert_eq!(summary.sources_completed, 1);

    let records = CsvSink::new(Path::new(&config.output.dataset_path)).load();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category.as_deref(), Some("Hats"));
    assert_eq!(records[0].name.as_deref(), Some("Cap"));
    assert_eq!(
        records[0].link.as_deref(),
        Some("https://shop.test/products/cap")
    );
    assert_eq!(read_progress(&config.output.progress_path).get(&hats), Some(&1));
}

#[tokio::test]
#[ignore = "needs a local Chrome or Chromium"]
async fn test_chrome_renderer_crawls_served_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "boots", 1, catalog_page("Boots", 2, &[("Chelsea", "$90.00")])).await;
    mount_page(&server, "boots", 2, catalog_page("Boots", 2, &[("Hiker", "$120.00")])).await;

    let boots = format!("{}/collections/boots", server.uri());
    let mut config = create_test_config(dir.path(), &[boots.clone()]);
    config.renderer.kind = RendererKind::Chrome;

    let summary = crawl(&config).await.unwrap();
    assert_eq!(summary.sources_completed, 1);
    assert_eq!(summary.page_errors, 0);

    let records = CsvSink::new(Path::new(&config.output.dataset_path)).load();
    let names: Vec<&str> = records.iter().filter_map(|r| r.name.as_deref()).collect();
    assert_eq!(names, vec!["Chelsea", "Hiker"]);
    assert_eq!(read_progress(&config.output.progress_path).get(&boots), Some(&2));
}

#[tokio::test]
async fn test_missing_source_list_creates_template() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path(), &[]);
    let sources_path = dir.path().join("nested").join("urls.txt");
    config.input.sources_path = sources_path.display().to_string();

    match crawl(&config).await {
        Err(HarvestError::Sources(SourceError::Missing { .. })) => {}
        other => panic!("expected missing source list, got {:?}", other),
    }

    let template = std::fs::read_to_string(&sources_path).unwrap();
    assert!(template.starts_with('#'));
    assert!(!Path::new(&config.output.progress_path).exists());
}

#[tokio::test]
async fn test_empty_source_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &["# nothing yet".to_string()]);

    match crawl(&config).await {
        Err(HarvestError::Sources(SourceError::Empty { .. })) => {}
        other => panic!("expected empty source list, got {:?}", other),
    }
}

/// What the artifacts held at the moment of one navigation
#[derive(Debug, Clone, PartialEq)]
struct Observation {
    url: String,
    dataset_rows: usize,
    progress: BTreeMap<String, u64>,
}

/// Renderer serving canned pages that records the artifact state at every navigation
struct ScriptedRenderer {
    pages: HashMap<String, String>,
    current: Option<String>,
    dataset: PathBuf,
    progress: PathBuf,
    log: Rc<RefCell<Vec<Observation>>>,
}

#[async_trait(?Send)]
impl PageRenderer for ScriptedRenderer {
    async fn navigate(
        &mut self,
        url: &Url,
        _timeout: Duration,
    ) -> Result<NavigationOutcome, RenderError> {
        let mut progress = JsonProgressStore::open(&self.progress);
        self.log.borrow_mut().push(Observation {
            url: url.to_string(),
            dataset_rows: CsvSink::new(&self.dataset).load().len(),
            progress: progress.load().clone(),
        });

        self.current = self.pages.get(url.as_str()).cloned();
        Ok(NavigationOutcome::Loaded)
    }

    async fn stop_loading(&mut self) {}

    async fn scroll_to_bottom(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<Dom, RenderError> {
        Ok(self.current.as_deref().map(Dom::parse).unwrap_or_else(Dom::empty))
    }

    async fn close(&mut self) {}
}

struct Harness {
    dir: TempDir,
    log: Rc<RefCell<Vec<Observation>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn dataset(&self) -> PathBuf {
        self.dir.path().join("products.csv")
    }

    fn progress(&self) -> PathBuf {
        self.dir.path().join("progress.json")
    }

    fn coordinator(&self, pages: HashMap<String, String>) -> Coordinator {
        let renderer = ScriptedRenderer {
            pages,
            current: None,
            dataset: self.dataset(),
            progress: self.progress(),
            log: Rc::clone(&self.log),
        };
        let progress = JsonProgressStore::open(&self.progress());
        progress.ensure_exists().unwrap();

        Coordinator::with_parts(
            CrawlerConfig {
                navigation_timeout_ms: 1_000,
                settle_delay_ms: 0,
                scroll_delay_ms: 0,
            },
            SelectorTable::compile(&SelectorConfig::default()).unwrap(),
            Box::new(renderer),
            Box::new(CsvSink::new(&self.dataset())),
            Box::new(progress),
        )
    }

    fn urls(&self) -> Vec<String> {
        self.log.borrow().iter().map(|o| o.url.clone()).collect()
    }
}

const SHOES: &str = "https://shop.test/collections/shoes";
const HATS: &str = "https://shop.test/collections/hats";

fn scripted_pages() -> HashMap<String, String> {
    let mut pages = HashMap::new();
    for page in 1..=3 {
        pages.insert(
            format!("{}?page={}", SHOES, page),
            catalog_page("Shoes", 3, &[("Runner", "$1"), ("Walker", "$2")]),
        );
    }
    pages.insert(
        format!("{}?page=1", HATS),
        catalog_page("Hats", 1, &[("Cap", "$3")]),
    );
    pages
}

#[tokio::test]
async fn test_artifacts_track_every_persisted_page() {
    let harness = Harness::new();
    let mut coordinator = harness.coordinator(scripted_pages());

    coordinator
        .run(&[SHOES.to_string(), HATS.to_string()])
        .await
        .unwrap();

    let log = harness.log.borrow();
    let seen: Vec<(usize, Option<u64>, Option<u64>)> = log
        .iter()
        .map(|o| {
            (
                o.dataset_rows,
                o.progress.get(SHOES).copied(),
                o.progress.get(HATS).copied(),
            )
        })
        .collect();

    assert_eq!(
        seen,
        vec![
            // shoes: discovery, then pages 1..=3
            (0, None, None),
            (0, None, None),
            (2, Some(2), None),
            (4, Some(4), None),
            // hats: discovery, then page 1
            (6, Some(6), None),
            (6, Some(6), None),
        ]
    );

    let mut progress = JsonProgressStore::open(&harness.progress());
    let final_progress = progress.load();
    assert_eq!(final_progress.get(SHOES), Some(&6));
    assert_eq!(final_progress.get(HATS), Some(&1));
    assert_eq!(CsvSink::new(&harness.dataset()).load().len(), 7);
}

#[tokio::test]
async fn test_progress_is_monotonic_within_a_run() {
    let harness = Harness::new();
    let mut coordinator = harness.coordinator(scripted_pages());

    coordinator.run(&[SHOES.to_string()]).await.unwrap();

    let counts: Vec<u64> = harness
        .log
        .borrow()
        .iter()
        .filter_map(|o| o.progress.get(SHOES).copied())
        .collect();
    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(coordinator.progress().count(SHOES), Some(6));
}

#[tokio::test]
async fn test_resumed_run_skips_harvested_sources() {
    let harness = Harness::new();

    harness
        .coordinator(scripted_pages())
        .run(&[SHOES.to_string()])
        .await
        .unwrap();
    harness.log.borrow_mut().clear();

    let mut resumed = harness.coordinator(scripted_pages());
    let summary = resumed
        .run(&[SHOES.to_string(), HATS.to_string()])
        .await
        .unwrap();

    assert_eq!(summary.sources_skipped, 1);
    assert!(harness.urls().iter().all(|url| !url.starts_with(SHOES)));
    assert_eq!(
        harness.urls(),
        vec![format!("{}?page=1", HATS), format!("{}?page=1", HATS)]
    );

    // Rows from the first run survive the rewrite
    let records = CsvSink::new(&harness.dataset()).load();
    assert_eq!(records.len(), 7);
    assert_eq!(records.last().and_then(|r| r.name.as_deref()), Some("Cap"));
}

#[tokio::test]
async fn test_everything_harvested_navigates_nothing() {
    let harness = Harness::new();
    let mut progress = JsonProgressStore::open(&harness.progress());
    progress.record_count(SHOES, 6);
    progress.record_count(HATS, 1);
    progress.persist().unwrap();

    let mut coordinator = harness.coordinator(scripted_pages());
    let summary = coordinator
        .run(&[SHOES.to_string(), HATS.to_string()])
        .await
        .unwrap();

    assert_eq!(summary.sources_skipped, 2);
    assert!(harness.urls().is_empty());
}
