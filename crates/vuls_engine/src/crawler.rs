use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use vuls_logging::{vuls_debug, vuls_info, vuls_warn};

use crate::{
    synthesize_demo, FetchError, FetchSettings, ListingParser, PageCache, PageFetcher, PageLoad,
    PageNumber, PageSettings, PageSource, ReqwestFetcher, TitleCellParser, VulnerabilityEntry,
};

/// Why the crawler last fell back to demo data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("transport failure: {0}")]
    Transport(#[from] FetchError),
    #[error("page {page} contained no recognisable entries")]
    EmptyResult { page: PageNumber },
}

/// Degraded-mode bookkeeping owned by one crawler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlerState {
    /// Sticky: once set, every load is served from demo data until reset.
    pub demo_mode_active: bool,
    pub last_error: Option<CrawlError>,
}

type PageLock = Arc<tokio::sync::Mutex<()>>;

/// Fetch, parse and cache listing pages, falling back to synthesized demo
/// entries whenever live data cannot be had. Never surfaces an error.
pub struct FeedCrawler {
    fetcher: PageFetcher,
    parser: Arc<dyn ListingParser>,
    cache: PageCache,
    state: Mutex<CrawlerState>,
    page_locks: Mutex<HashMap<PageNumber, PageLock>>,
}

impl FeedCrawler {
    pub fn new(fetcher: PageFetcher, parser: Arc<dyn ListingParser>) -> Self {
        Self {
            fetcher,
            parser,
            cache: PageCache::new(),
            state: Mutex::new(CrawlerState::default()),
            page_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Crawler over the reqwest transport and the title-cell parser.
    pub fn with_settings(fetch: FetchSettings, pages: PageSettings) -> Result<Self, FetchError> {
        let fetcher = PageFetcher::new(Arc::new(ReqwestFetcher::new(fetch)?), pages);
        Ok(Self::new(fetcher, Arc::new(TitleCellParser)))
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn state(&self) -> CrawlerState {
        self.lock_state().clone()
    }

    pub fn is_degraded(&self) -> bool {
        self.lock_state().demo_mode_active
    }

    pub fn last_error(&self) -> Option<CrawlError> {
        self.lock_state().last_error.clone()
    }

    pub fn page_settings(&self) -> &PageSettings {
        self.fetcher.settings()
    }

    fn base_origin(&self) -> &str {
        &self.fetcher.settings().base_origin
    }

    /// Entries for `page`; see [`FeedCrawler::load_page`].
    pub async fn get_vulnerabilities(&self, page: PageNumber) -> Vec<VulnerabilityEntry> {
        self.load_page(page).await.entries
    }

    /// Demo data while degraded, else the cached page, else a live fetch.
    pub async fn load_page(&self, page: PageNumber) -> PageLoad {
        let page = page.max(1);
        let lock = self.page_lock(page);
        let load = {
            let _guard = lock.lock().await;
            self.load_page_locked(page).await
        };
        self.release_page_lock(page, lock);
        load
    }

    async fn load_page_locked(&self, page: PageNumber) -> PageLoad {
        if self.is_degraded() {
            vuls_debug!("Serving demo data for page {page}");
            return self.demo_load(page);
        }

        if let Some(markup) = self.cache.get(page) {
            let entries = self.parser.parse(&markup, self.base_origin());
            if !entries.is_empty() {
                vuls_debug!("Cache hit for page {page}");
                return self.page_load(page, entries, PageSource::Cached);
            }
            self.cache.invalidate(page);
        }
        vuls_debug!("Cache miss for page {page}");

        self.load_live(page).await
    }

    /// Drops the cached copy of `page` and fetches it again, even while
    /// degraded. A non-empty live result leaves demo mode.
    pub async fn refresh(&self, page: PageNumber) -> PageLoad {
        let page = page.max(1);
        let lock = self.page_lock(page);
        let load = {
            let _guard = lock.lock().await;
            self.refresh_locked(page).await
        };
        self.release_page_lock(page, lock);
        load
    }

    async fn refresh_locked(&self, page: PageNumber) -> PageLoad {
        self.cache.invalidate(page);
        let was_degraded = self.is_degraded();
        let load = self.load_live(page).await;
        if was_degraded && load.source == PageSource::Live {
            self.reset_degraded();
            return self.page_load(page, load.entries, PageSource::Live);
        }
        load
    }

    /// Fetches `page` bypassing cache and degraded mode. Used for raw dumps.
    pub async fn fetch_markup(&self, page: PageNumber) -> Result<String, FetchError> {
        self.fetcher.fetch_page(page.max(1)).await
    }

    /// Drops every cached page; degraded mode is left as is.
    pub fn clear_cache(&self) {
        self.cache.clear();
        vuls_debug!("Page cache cleared");
    }

    pub fn reset_degraded(&self) {
        let mut state = self.lock_state();
        if state.demo_mode_active {
            vuls_info!("Leaving demo mode");
        }
        state.demo_mode_active = false;
        state.last_error = None;
    }

    /// Starts serving demo data without a triggering failure.
    pub fn enter_demo_mode(&self) {
        let mut state = self.lock_state();
        if !state.demo_mode_active {
            vuls_info!("Demo mode requested; network disabled");
        }
        state.demo_mode_active = true;
    }

    async fn load_live(&self, page: PageNumber) -> PageLoad {
        let markup = match self.fetcher.fetch_page(page).await {
            Ok(markup) => markup,
            Err(err) => return self.degrade(page, CrawlError::Transport(err)),
        };

        let entries = self.parser.parse(&markup, self.base_origin());
        if entries.is_empty() {
            return self.degrade(page, CrawlError::EmptyResult { page });
        }

        vuls_info!("Fetched page {page}: {} entries", entries.len());
        self.cache.put(page, markup);
        self.page_load(page, entries, PageSource::Live)
    }

    fn degrade(&self, page: PageNumber, cause: CrawlError) -> PageLoad {
        {
            let mut state = self.lock_state();
            if state.demo_mode_active {
                vuls_warn!("Page {page} still unavailable: {cause}");
            } else {
                vuls_warn!("Entering demo mode after page {page} failed: {cause}");
            }
            state.demo_mode_active = true;
            state.last_error = Some(cause);
        }
        self.demo_load(page)
    }

    fn demo_load(&self, page: PageNumber) -> PageLoad {
        let entries = synthesize_demo(page, self.base_origin());
        self.page_load(page, entries, PageSource::Demo)
    }

    fn page_load(
        &self,
        page: PageNumber,
        entries: Vec<VulnerabilityEntry>,
        source: PageSource,
    ) -> PageLoad {
        let state = self.lock_state();
        PageLoad {
            page,
            entries,
            source,
            degraded: state.demo_mode_active,
            last_error: state.last_error.clone(),
        }
    }

    /// Pages with a load or refresh currently holding or waiting on a lock.
    pub fn tracked_page_locks(&self) -> usize {
        self.lock_page_locks().len()
    }

    fn page_lock(&self, page: PageNumber) -> PageLock {
        self.lock_page_locks().entry(page).or_default().clone()
    }

    /// Drops the map entry for `page` once no other caller holds it.
    fn release_page_lock(&self, page: PageNumber, lock: PageLock) {
        drop(lock);
        let mut locks = self.lock_page_locks();
        if locks
            .get(&page)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&page);
        }
    }

    fn lock_page_locks(&self) -> MutexGuard<'_, HashMap<PageNumber, PageLock>> {
        self.page_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_state(&self) -> MutexGuard<'_, CrawlerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
