//! Scrape-dedup-persist orchestration.
//!
//! One run walks listing pages `1..=pages` in order. For each product on a
//! page:
//!
//! 1. look up `product_details:<title>` through the `redis` storage
//! 2. skip it when the cached price equals the scraped price
//! 3. otherwise download the image and save it through the `local` storage
//! 4. overwrite the cache entry and add the record to the page batch
//!
//! After each page the batch is appended to the catalog document. Pages that
//! cannot be fetched, malformed products and unavailable images are recorded
//! in the [`ScrapeSummary`] and skipped. Storage failures end the run.

mod summary;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

pub use summary::{ScrapeFailure, ScrapeSummary};

use crate::fetch::{FetchConfig, Fetcher, HttpTransport, Transport, listing_base, page_url};
use crate::parse::{ParserConfig, ProductParser, RawProduct};
use shopscrape_core::storage::{LOCAL, REDIS, StorageFactory, load, store};
use shopscrape_core::{
    AppConfig, CacheClient, ConsoleNotifier, Error, KeyLocks, Notifier, ProductRecord, StorageSelector, StorageTarget,
    image_file_name, product_cache_key,
};

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Listing root; must end with `/`.
    pub base_url: Url,
    pub catalog_file: String,
    pub cache_ttl: Option<Duration>,
    pub image_extension: String,
}

impl ScrapeSettings {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let base_url = listing_base(base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { base_url, catalog_file: "products.json".to_string(), cache_ttl: None, image_extension: "jpg".into() })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let base_url = config.require_base_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let mut settings = Self::new(base_url)?;
        settings.catalog_file = config.catalog_file.clone();
        settings.cache_ttl = config.cache_ttl();
        Ok(settings)
    }
}

/// Parameters of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub pages: u32,
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self { pages: 5 }
    }
}

enum ProductOutcome {
    Scraped(ProductRecord),
    Skipped,
    Failed(String),
    Cancelled,
}

/// The two storages a run writes through, resolved once per run.
struct RunStorages {
    cache: StorageFactory,
    local: StorageFactory,
}

pub struct Scraper<T = HttpTransport> {
    fetcher: Fetcher<T>,
    parser: ProductParser,
    storage: StorageSelector,
    locks: KeyLocks,
    notifier: Arc<dyn Notifier>,
    settings: ScrapeSettings,
}

impl Scraper<HttpTransport> {
    /// Wire a scraper from application config with the default selectors.
    ///
    /// `proxy` overrides the configured proxy for this scraper only.
    pub fn from_config(
        config: &AppConfig, cache: CacheClient, locks: KeyLocks, proxy: Option<String>,
    ) -> Result<Self, Error> {
        let fetcher = Fetcher::from_config(&FetchConfig::from_app_config(config).with_proxy(proxy))?;
        let parser = ProductParser::new(&ParserConfig::default())?;
        let storage = StorageSelector::with_defaults(config.data_root.clone(), cache, locks.clone());
        Ok(Self::new(fetcher, parser, storage, locks, ScrapeSettings::from_app_config(config)?))
    }
}

impl<T: Transport> Scraper<T> {
    pub fn new(
        fetcher: Fetcher<T>, parser: ProductParser, storage: StorageSelector, locks: KeyLocks,
        settings: ScrapeSettings,
    ) -> Self {
        Self { fetcher, parser, storage, locks, notifier: Arc::new(ConsoleNotifier::default()), settings }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Scrape pages `1..=request.pages`.
    ///
    /// # Errors
    ///
    /// Fails when a storage technique is not registered or a cache, catalog or
    /// image write fails. Everything else is recorded in the summary.
    pub async fn run(&self, request: &ScrapeRequest, cancel: &CancellationToken) -> Result<ScrapeSummary, Error> {
        let storages = RunStorages { cache: self.storage.resolve(REDIS)?, local: self.storage.resolve(LOCAL)? };
        let mut summary = ScrapeSummary::start();

        tracing::info!(pages = request.pages, base_url = %self.settings.base_url, "scrape started");

        for page in 1..=request.pages {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            self.scrape_page(page, &storages, &mut summary, cancel).await?;
            if summary.cancelled {
                break;
            }
        }

        summary.finish();
        tracing::info!(
            scraped = summary.scraped,
            skipped = summary.skipped,
            failed = summary.failed,
            pages_missing = summary.pages_missing,
            cancelled = summary.cancelled,
            "scrape finished"
        );
        self.notifier.notify(&summary.notification());

        Ok(summary)
    }

    async fn scrape_page(
        &self, page: u32, storages: &RunStorages, summary: &mut ScrapeSummary, cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let url = page_url(&self.settings.base_url, page).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let Some(body) = self.fetcher.fetch(url.as_str(), cancel).await else {
            if cancel.is_cancelled() {
                summary.cancelled = true;
            } else {
                tracing::warn!(page, url = %url, "page unavailable, skipping");
                summary.record_missing_page(page, url.as_str());
            }
            return Ok(());
        };
        summary.pages_fetched += 1;

        let parsed = self.parser.parse(&String::from_utf8_lossy(&body));
        tracing::debug!(page, products = parsed.products.len(), malformed = parsed.failures.len(), "page parsed");

        for node in parsed.failures {
            summary.record_failure(page, node.title, node.error.to_string());
        }

        let mut batch = Vec::new();
        let mut aborted = None;
        for product in parsed.products {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let title = product.title.clone();
            let outcome = match self.process_product(&url, product, storages, cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    aborted = Some(e);
                    break;
                }
            };
            match outcome {
                ProductOutcome::Scraped(record) => {
                    summary.scraped += 1;
                    batch.push(record);
                }
                ProductOutcome::Skipped => summary.skipped += 1,
                ProductOutcome::Failed(reason) => {
                    tracing::warn!(page, title = %title, reason = %reason, "product skipped");
                    summary.record_failure(page, Some(title), reason);
                }
                ProductOutcome::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
            }
        }

        // Products already written to the cache must reach the catalog too,
        // including when the page was cut short by cancellation or an error.
        let appended = self.append_batch(page, storages, &batch).await;
        match aborted {
            Some(e) => {
                if let Err(append_err) = appended {
                    tracing::error!(page, error = %append_err, "failed to append partial batch");
                }
                Err(e)
            }
            None => appended,
        }
    }

    async fn append_batch(&self, page: u32, storages: &RunStorages, batch: &[ProductRecord]) -> Result<(), Error> {
        if batch.is_empty() {
            return Ok(());
        }
        let catalog = (storages.local)(StorageTarget::new(self.settings.catalog_file.as_str()))?;
        store(catalog.as_ref(), batch).await?;
        tracing::debug!(page, appended = batch.len(), "catalog appended");
        Ok(())
    }

    async fn process_product(
        &self, listing_page: &Url, product: RawProduct, storages: &RunStorages, cancel: &CancellationToken,
    ) -> Result<ProductOutcome, Error> {
        let RawProduct { title, price, image_url } = product;
        let key = product_cache_key(&title);
        let _guard = self.locks.lock(&key).await;

        let cache = (storages.cache)(StorageTarget::new(key.as_str()).with_ttl(self.settings.cache_ttl))?;
        let cached = match load::<ProductRecord>(cache.as_ref()).await {
            Ok(cached) => cached,
            Err(Error::Serialization(e)) => {
                tracing::warn!(key = %key, error = %e, "undecodable cache entry, treating as absent");
                None
            }
            Err(e) => return Err(e),
        };

        if cached.as_ref().is_some_and(|record| record.has_price(&price)) {
            tracing::debug!(key = %key, price = %price, "unchanged, skipping");
            return Ok(ProductOutcome::Skipped);
        }

        let image_url = match listing_page.join(&image_url) {
            Ok(url) => url,
            Err(e) => return Ok(ProductOutcome::Failed(format!("invalid image URL {image_url:?}: {e}"))),
        };

        let Some(image) = self.fetcher.fetch(image_url.as_str(), cancel).await else {
            if cancel.is_cancelled() {
                return Ok(ProductOutcome::Cancelled);
            }
            return Ok(ProductOutcome::Failed(format!("image unavailable after retries: {image_url}")));
        };

        let image_storage = (storages.local)(StorageTarget::new(image_file_name(
            &title,
            &self.settings.image_extension,
        )))?;
        let path = image_storage.save_image(&image).await?;

        let record = ProductRecord { product_title: title, product_price: price, path_to_image: path.display().to_string() };
        store(cache.as_ref(), &record).await?;

        tracing::debug!(key = %key, previous = cached.map(|r| r.product_price), "product scraped");

        Ok(ProductOutcome::Scraped(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    use crate::fetch::RetryPolicy;
    use shopscrape_core::cache::KvBackend;
    use shopscrape_core::storage::{CacheStorage, FileStorage, Storage};

    const BASE: &str = "https://shop.example/shop/";

    /// Serves canned bodies by URL; anything else is a 404.
    #[derive(Default)]
    struct Routes {
        bodies: Mutex<HashMap<String, Bytes>>,
        requested: Mutex<Vec<String>>,
    }

    impl Routes {
        fn serve(&self, url: &str, body: impl Into<Bytes>) {
            self.bodies.lock().unwrap().insert(url.to_string(), body.into());
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for Routes {
        async fn get(&self, url: &str) -> Result<Bytes, Error> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| Error::HttpError("status 404".into()))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Notifier for Recorder {
        fn notify(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    fn product(title: &str, price: &str, image: &str) -> String {
        format!(
            r#"<li class="product">
                <div class="mf-product-thumbnail"><img data-lazy-src="{image}"></div>
                <h2 class="woo-loop-product__title">{title}</h2>
                <span class="price"><span class="amount">${price}</span></span>
            </li>"#
        )
    }

    fn listing(products: &[String]) -> String {
        format!("<html><body><ul class=\"products\">{}</ul></body></html>", products.concat())
    }

    fn serve_widgets(routes: &Routes, price_b: &str) {
        routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[
                product("Widget A", "10", "https://cdn.example/a.jpg"),
                product("Widget B", price_b, "https://cdn.example/b.jpg"),
            ]),
        );
        routes.serve("https://cdn.example/a.jpg", Bytes::from_static(b"\xff\xd8a"));
        routes.serve("https://cdn.example/b.jpg", Bytes::from_static(b"\xff\xd8b"));
    }

    struct Harness {
        routes: Arc<Routes>,
        cache: CacheClient,
        notes: Arc<Recorder>,
        scraper: Scraper<Arc<Routes>>,
    }

    /// A cache backend whose server is gone.
    #[derive(Debug)]
    struct Unreachable;

    #[async_trait::async_trait]
    impl KvBackend for Unreachable {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::Cache("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Option<Duration>) -> Result<(), Error> {
            Err(Error::Cache("connection refused".into()))
        }
    }

    async fn harness(root: &Path) -> Harness {
        harness_with(root, CacheClient::open_in_memory().await.unwrap())
    }

    fn harness_with(root: &Path, cache: CacheClient) -> Harness {
        let routes = Arc::new(Routes::default());
        let locks = KeyLocks::new();
        let notes = Arc::new(Recorder::default());

        let fetcher = Fetcher::new(routes.clone(), RetryPolicy { retries: 1, interval: Duration::ZERO });
        let parser = ProductParser::new(&ParserConfig::default()).unwrap();
        let storage = StorageSelector::with_defaults(root, cache.clone(), locks.clone());
        let scraper = Scraper::new(fetcher, parser, storage, locks, ScrapeSettings::new(BASE).unwrap())
            .with_notifier(notes.clone());

        Harness { routes, cache, notes, scraper }
    }

    async fn cached(cache: &CacheClient, title: &str) -> Option<ProductRecord> {
        load::<ProductRecord>(&CacheStorage::new(cache.clone(), product_cache_key(title), None)).await.unwrap()
    }

    async fn catalog(root: &Path) -> Vec<Value> {
        let storage = FileStorage::new(root, "products.json", KeyLocks::new()).unwrap();
        match storage.get_data().await.unwrap() {
            Value::Array(items) => items,
            other => panic!("catalog is not an array: {other}"),
        }
    }

    fn one_page() -> ScrapeRequest {
        ScrapeRequest { pages: 1 }
    }

    #[tokio::test]
    async fn test_first_run_scrapes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");

        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.pages_fetched, 1);
        assert!(summary.finished_at.is_some());

        assert_eq!(cached(&h.cache, "Widget A").await.unwrap().product_price, "10");
        assert_eq!(cached(&h.cache, "Widget B").await.unwrap().product_price, "15");

        assert_eq!(std::fs::read(dir.path().join("images/Widget_A.jpg")).unwrap(), b"\xff\xd8a");
        assert_eq!(std::fs::read(dir.path().join("images/Widget_B.jpg")).unwrap(), b"\xff\xd8b");

        let items = catalog(dir.path()).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["product_title"], "Widget A");
        assert_eq!(items[0]["product_price"], "10");
        assert_eq!(items[1]["product_price"], "15");
        assert!(items[0]["path_to_image"].as_str().unwrap().ends_with("Widget_A.jpg"));

        assert_eq!(h.notes.0.lock().unwrap().as_slice(), ["Total Products Scrapped : 2"]);
    }

    #[tokio::test]
    async fn test_second_identical_run_scrapes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");

        h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();
        let requests_after_first = h.routes.requested().len();
        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(catalog(dir.path()).await.len(), 2);
        // Only the listing page was requested again, no images.
        assert_eq!(h.routes.requested().len(), requests_after_first + 1);
        assert_eq!(h.notes.0.lock().unwrap().last().unwrap(), "Total Products Scrapped : 0");
    }

    #[tokio::test]
    async fn test_price_change_is_reprocessed() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");
        h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        serve_widgets(&h.routes, "12");
        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(cached(&h.cache, "Widget B").await.unwrap().product_price, "12");

        let items = catalog(dir.path()).await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["product_title"], "Widget B");
        assert_eq!(items[2]["product_price"], "12");
    }

    #[tokio::test]
    async fn test_missing_page_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");
        h.routes.serve(
            "https://shop.example/shop/page/3/",
            listing(&[product("Widget C", "7", "https://cdn.example/c.jpg")]),
        );
        h.routes.serve("https://cdn.example/c.jpg", Bytes::from_static(b"c"));

        let summary = h.scraper.run(&ScrapeRequest { pages: 3 }, &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 3);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(summary.pages_missing, 1);
        assert_eq!(summary.failures[0].page, 2);
        assert_eq!(catalog(dir.path()).await.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_product_and_missing_image_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        h.routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[
                product("Widget A", "10", "https://cdn.example/a.jpg"),
                r#"<li class="product"><h2 class="woo-loop-product__title">Broken</h2></li>"#.to_string(),
                product("Widget D", "3", "https://cdn.example/gone.jpg"),
            ]),
        );
        h.routes.serve("https://cdn.example/a.jpg", Bytes::from_static(b"a"));

        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.failed, 2);
        let products: Vec<_> = summary.failures.iter().map(|f| f.product.as_deref()).collect();
        assert_eq!(products, vec![Some("Broken"), Some("Widget D")]);
        assert!(cached(&h.cache, "Widget D").await.is_none());
        assert_eq!(catalog(dir.path()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_relative_image_url_resolved_against_page() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        h.routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[product("Widget A", "10", "/media/a.jpg")]),
        );
        h.routes.serve("https://shop.example/media/a.jpg", Bytes::from_static(b"a"));

        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 1);
        assert!(h.routes.requested().contains(&"https://shop.example/media/a.jpg".to_string()));
    }

    #[tokio::test]
    async fn test_empty_page_leaves_catalog_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        h.routes.serve("https://shop.example/shop/page/1/", listing(&[]));

        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 0);
        assert!(!dir.path().join("data").join("products.json").exists());
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = h.scraper.run(&ScrapeRequest { pages: 3 }, &cancel).await.unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.scraped, 0);
        assert!(h.routes.requested().is_empty());
        assert_eq!(h.notes.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_cache_entry_shape_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");
        h.cache.set(&product_cache_key("Widget A"), &serde_json::json!({"unexpected": true}), None).await.unwrap();

        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 2);
        assert_eq!(cached(&h.cache, "Widget A").await.unwrap().product_price, "10");
    }

    #[tokio::test]
    async fn test_missing_technique_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let routes = Arc::new(Routes::default());
        let locks = KeyLocks::new();
        let mut storage = StorageSelector::new();
        let root = dir.path().to_path_buf();
        let file_locks = locks.clone();
        storage.register(LOCAL, move |target: StorageTarget| {
            Ok(Box::new(FileStorage::new(root.clone(), target.name, file_locks.clone())?) as Box<dyn Storage>)
        });

        let scraper = Scraper::new(
            Fetcher::new(routes.clone(), RetryPolicy { retries: 1, interval: Duration::ZERO }),
            ProductParser::new(&ParserConfig::default()).unwrap(),
            storage,
            locks,
            ScrapeSettings::new(BASE).unwrap(),
        );

        let result = scraper.run(&one_page(), &CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::UnknownTechnique(name)) if name == "redis"));
        assert!(routes.requested().is_empty());
    }

    #[tokio::test]
    async fn test_widget_a_price_change_overwrites_cache() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        serve_widgets(&h.routes, "15");
        h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        h.routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[
                product("Widget A", "12", "https://cdn.example/a.jpg"),
                product("Widget B", "15", "https://cdn.example/b.jpg"),
            ]),
        );
        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(cached(&h.cache, "Widget A").await.unwrap().product_price, "12");
        assert_eq!(cached(&h.cache, "Widget B").await.unwrap().product_price, "15");

        let items = catalog(dir.path()).await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["product_title"], "Widget A");
        assert_eq!(items[2]["product_price"], "12");
    }

    #[tokio::test]
    async fn test_write_failure_still_appends_earlier_products() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path()).await;
        let long_title = "L".repeat(300);
        h.routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[
                product("Widget A", "10", "https://cdn.example/a.jpg"),
                product(&long_title, "5", "https://cdn.example/long.jpg"),
            ]),
        );
        h.routes.serve("https://cdn.example/a.jpg", Bytes::from_static(b"a"));
        h.routes.serve("https://cdn.example/long.jpg", Bytes::from_static(b"l"));

        // The image file name exceeds the file system's name limit.
        let result = h.scraper.run(&one_page(), &CancellationToken::new()).await;
        assert!(matches!(result, Err(Error::Io(_))));

        assert_eq!(cached(&h.cache, "Widget A").await.unwrap().product_price, "10");
        let items = catalog(dir.path()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["product_title"], "Widget A");

        h.routes.serve(
            "https://shop.example/shop/page/1/",
            listing(&[product("Widget A", "10", "https://cdn.example/a.jpg")]),
        );
        let summary = h.scraper.run(&one_page(), &CancellationToken::new()).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(catalog(dir.path()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_transport_failure_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness_with(dir.path(), CacheClient::new(Arc::new(Unreachable)));
        serve_widgets(&h.routes, "15");

        let result = h.scraper.run(&one_page(), &CancellationToken::new()).await;

        assert!(matches!(result, Err(Error::Cache(_))));
        assert!(!dir.path().join("data").join("products.json").exists());
        assert!(!dir.path().join("images").exists());
        assert!(h.notes.0.lock().unwrap().is_empty());
    }
}
