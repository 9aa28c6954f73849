use std::fmt;

use crate::CrawlError;

pub type PageNumber = u32;
pub type RequestId = u64;

/// Entries per listing page upstream.
pub const PAGE_SIZE: usize = 20;

pub const DEFAULT_BASE_ORIGIN: &str = "https://zeroday.hitcon.org";
pub const DEFAULT_PAGE_URL_TEMPLATE: &str =
    "https://zeroday.hitcon.org/vulnerability/disclosed/page/{page}";

/// One vulnerability disclosure from the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnerabilityEntry {
    path: String,
    title: String,
    canonical_url: String,
}

impl VulnerabilityEntry {
    /// Builds an entry; the canonical URL is `base_origin + path`, fixed here.
    pub fn new(base_origin: &str, path: impl Into<String>, title: impl Into<String>) -> Self {
        let path = path.into();
        let origin = base_origin.trim_end_matches('/');
        let canonical_url = if path.starts_with('/') || path.is_empty() {
            format!("{origin}{path}")
        } else {
            format!("{origin}/{path}")
        };
        Self {
            path,
            title: title.into(),
            canonical_url,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }
}

/// Where a page's entries came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Live,
    Cached,
    Demo,
}

/// Result of a crawler load. Always usable, even when degraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLoad {
    pub page: PageNumber,
    pub entries: Vec<VulnerabilityEntry>,
    pub source: PageSource,
    pub degraded: bool,
    pub last_error: Option<CrawlError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    PageLoaded { request: RequestId, load: PageLoad },
}

/// Raw response from the transport, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub final_url: String,
}

/// Transport-level failure with a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    AccessDenied(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => f.write_str("malformed page url"),
            Self::HttpStatus(code) => write!(f, "upstream answered {code}"),
            Self::AccessDenied(code) => write!(f, "access denied ({code})"),
            Self::Timeout => f.write_str("request timed out"),
            Self::RedirectLimitExceeded => f.write_str("too many redirects"),
            Self::TooLarge {
                max_bytes,
                actual: Some(actual),
            } => write!(f, "body of {actual} bytes over the {max_bytes} byte cap"),
            Self::TooLarge { max_bytes, actual: None } => {
                write!(f, "body over the {max_bytes} byte cap")
            }
            Self::Network => f.write_str("connection failed"),
        }
    }
}
