use std::sync::Arc;

use vuls_logging::{vuls_debug, vuls_warn};

use crate::{
    decode_markup, FailureKind, FetchError, Fetcher, PageNumber, DEFAULT_BASE_ORIGIN,
    DEFAULT_PAGE_URL_TEMPLATE,
};

/// Where listing pages live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// URL with a `{page}` placeholder.
    pub url_template: String,
    /// Prefix for the relative paths found in listings.
    pub base_origin: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_PAGE_URL_TEMPLATE.to_string(),
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
        }
    }
}

impl PageSettings {
    pub fn page_url(&self, page: PageNumber) -> Result<String, FetchError> {
        if !self.url_template.contains("{page}") {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("template `{}` has no {{page}} placeholder", self.url_template),
            ));
        }
        let raw = self.url_template.replace("{page}", &page.to_string());
        url::Url::parse(&raw)
            .map(|url| url.to_string())
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))
    }
}

/// Fetches one listing page and turns the response into decoded markup.
#[derive(Clone)]
pub struct PageFetcher {
    fetcher: Arc<dyn Fetcher>,
    settings: PageSettings,
}

impl PageFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: PageSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Performs exactly one request. Non-2xx statuses are errors; 401 and
    /// 403 are reported as access denied.
    pub async fn fetch_page(&self, page: PageNumber) -> Result<String, FetchError> {
        let url = self.settings.page_url(page)?;
        vuls_debug!("Fetching page {page} from {url}");

        let output = self.fetcher.fetch(&url).await?;
        vuls_debug!("Page {page} answered {} ({} bytes)", output.status, output.body.len());
        match output.status {
            200..=299 => {}
            401 | 403 => {
                return Err(FetchError::new(
                    FailureKind::AccessDenied(output.status),
                    format!("{url} refused the request"),
                ))
            }
            status => {
                return Err(FetchError::new(
                    FailureKind::HttpStatus(status),
                    format!("{url} answered {status}"),
                ))
            }
        }

        let decoded = decode_markup(&output.body, output.content_type.as_deref());
        if decoded.had_errors {
            vuls_warn!(
                "Page {page} contained bytes invalid for {}; replaced",
                decoded.encoding_label
            );
        }
        Ok(decoded.markup)
    }
}
