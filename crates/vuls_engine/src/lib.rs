//! Vuls engine: fetching, parsing, caching and the degraded-mode crawler.
mod cache;
mod crawler;
mod decode;
mod demo;
mod engine;
mod export;
mod fetch;
mod page;
mod parse;
mod persist;
mod types;

pub use cache::PageCache;
pub use crawler::{CrawlError, CrawlerState, FeedCrawler};
pub use decode::{decode_markup, DecodedMarkup};
pub use demo::{demo_id, synthesize_demo, DEMO_PATH_PREFIX};
pub use engine::{EngineCommand, EngineHandle};
pub use export::{export_entries, format_entries, ExportError, ExportFormat, ExportMode};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use page::{PageFetcher, PageSettings};
pub use parse::{ListingParser, TitleCellParser};
pub use persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchOutput, PageLoad, PageNumber, PageSource,
    RequestId, VulnerabilityEntry, DEFAULT_BASE_ORIGIN, DEFAULT_PAGE_URL_TEMPLATE, PAGE_SIZE,
};
