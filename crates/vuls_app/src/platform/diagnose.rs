//! `diagnose`: checks whether the listing is reachable from this machine.

use std::fmt::Write as _;

use vuls_engine::{
    decode_markup, Fetcher, ListingParser, PageSettings, ReqwestFetcher, TitleCellParser,
};
use vuls_logging::{vuls_info, vuls_warn};

use super::config::AppConfig;

const PROXY_VARS: [&str; 8] = [
    "http_proxy",
    "https_proxy",
    "all_proxy",
    "no_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "NO_PROXY",
];
const SAMPLE_ENTRIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    /// 2xx with at least one parsed entry.
    Ok { status: u16, body_len: usize, entries: Vec<(String, String)> },
    /// 2xx but nothing recognisable in the markup.
    NoEntries { status: u16, body_len: usize, preview: String },
    /// Non-2xx answer.
    Status { status: u16, body_len: usize },
    /// No response at all.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisReport {
    pub url: String,
    pub proxies: Vec<(String, String)>,
    pub reachability: Reachability,
}

impl DiagnosisReport {
    pub fn is_success(&self) -> bool {
        matches!(self.reachability, Reachability::Ok { .. })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Proxy settings:");
        if self.proxies.is_empty() {
            let _ = writeln!(out, "  none detected");
        }
        for (name, value) in &self.proxies {
            let _ = writeln!(out, "  {name} = {}", truncate(value, 80));
        }

        let _ = writeln!(out, "\nListing page: {}", self.url);
        match &self.reachability {
            Reachability::Ok {
                status,
                body_len,
                entries,
            } => {
                let _ = writeln!(out, "  status {status}, {body_len} bytes");
                let _ = writeln!(out, "  parsed {} entries", entries.len());
                for (url, title) in entries.iter().take(SAMPLE_ENTRIES) {
                    let _ = writeln!(out, "    {url} {}", truncate(title, 60));
                }
            }
            Reachability::NoEntries {
                status,
                body_len,
                preview,
            } => {
                let _ = writeln!(out, "  status {status}, {body_len} bytes");
                let _ = writeln!(out, "  parsed 0 entries; page starts with:");
                let _ = writeln!(out, "{preview}");
            }
            Reachability::Status { status, body_len } => {
                let _ = writeln!(out, "  status {status}, {body_len} bytes");
                if *status == 401 || *status == 403 {
                    let _ = writeln!(out, "  access denied");
                }
            }
            Reachability::Failed(message) => {
                let _ = writeln!(out, "  request failed: {message}");
            }
        }

        let _ = writeln!(out);
        if self.is_success() {
            let _ = writeln!(out, "The listing is reachable; live data should load.");
        } else {
            let _ = writeln!(out, "The listing is not reachable; the browser will show demo data.");
            if !self.proxies.is_empty() {
                let _ = writeln!(out, "A proxy is configured and may be blocking the site.");
            }
        }
        out
    }
}

/// Proxy-related environment variables that are set and non-empty.
pub fn proxy_environment() -> Vec<(String, String)> {
    PROXY_VARS
        .iter()
        .filter_map(|name| {
            let value = std::env::var(name).ok()?;
            (!value.is_empty()).then(|| (name.to_string(), value))
        })
        .collect()
}

/// Fetches page 1 once through `fetcher` and classifies the outcome.
pub async fn diagnose(
    fetcher: &dyn Fetcher,
    pages: &PageSettings,
    proxies: Vec<(String, String)>,
) -> DiagnosisReport {
    let url = match pages.page_url(1) {
        Ok(url) => url,
        Err(err) => {
            return DiagnosisReport {
                url: pages.url_template.clone(),
                proxies,
                reachability: Reachability::Failed(err.to_string()),
            }
        }
    };

    let reachability = match fetcher.fetch(&url).await {
        Err(err) => {
            vuls_warn!("Diagnosis request to {url} failed: {err}");
            Reachability::Failed(err.to_string())
        }
        Ok(output) if !(200..300).contains(&output.status) => Reachability::Status {
            status: output.status,
            body_len: output.body.len(),
        },
        Ok(output) => {
            let decoded = decode_markup(&output.body, output.content_type.as_deref());
            let entries: Vec<(String, String)> = TitleCellParser
                .parse(&decoded.markup, &pages.base_origin)
                .into_iter()
                .map(|entry| (entry.canonical_url().to_string(), entry.title().to_string()))
                .collect();
            if entries.is_empty() {
                Reachability::NoEntries {
                    status: output.status,
                    body_len: output.body.len(),
                    preview: truncate(&decoded.markup, 500),
                }
            } else {
                Reachability::Ok {
                    status: output.status,
                    body_len: output.body.len(),
                    entries,
                }
            }
        }
    };
    vuls_info!("Diagnosis of {url}: {reachability:?}");

    DiagnosisReport {
        url,
        proxies,
        reachability,
    }
}

/// Runs the diagnosis with the configured transport and prints the report.
/// Returns whether the listing was reachable.
pub fn run_diagnose(config: &AppConfig) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let fetcher = ReqwestFetcher::new(config.fetch_settings())?;
    let report = runtime.block_on(diagnose(
        &fetcher,
        &config.page_settings(),
        proxy_environment(),
    ));
    print!("{}", report.render());
    Ok(report.is_success())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
