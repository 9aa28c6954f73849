//! `--once`: list one page on stdout without taking over the terminal.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use vuls_engine::{
    export_entries, format_entries, AtomicFileWriter, ExportFormat, FeedCrawler, PageLoad,
    PageNumber, PageSource,
};
use vuls_logging::{vuls_info, vuls_warn};

use super::effects::ExportTarget;

#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub page: PageNumber,
    pub export: Option<ExportTarget>,
    pub save_html: Option<PathBuf>,
}

/// Loads `options.page`, prints one `"<url> <title>"` line per entry to `out`
/// and performs the requested export and markup dump. Demo data is reported
/// on stderr so stdout stays machine-readable.
pub async fn list_page<W: Write>(
    crawler: &FeedCrawler,
    options: &HeadlessOptions,
    out: &mut W,
) -> anyhow::Result<PageLoad> {
    let load = crawler.load_page(options.page).await;

    out.write_all(format_entries(&load.entries, ExportFormat::Text)?.as_bytes())?;
    out.flush()?;

    if load.source == PageSource::Demo {
        match &load.last_error {
            Some(err) => eprintln!("DEMO data for page {}: {err}", load.page),
            None => eprintln!("DEMO data for page {}", load.page),
        }
    }

    if let Some(target) = &options.export {
        let count = export_entries(&target.path, &load.entries, target.mode, target.format)
            .with_context(|| format!("exporting to {}", target.path.display()))?;
        vuls_info!("Exported {count} entries to {}", target.path.display());
        eprintln!("Saved {count} entries to {}", target.path.display());
    }

    if let Some(path) = &options.save_html {
        save_markup(crawler, load.page, path).await?;
    }

    Ok(load)
}

async fn save_markup(
    crawler: &FeedCrawler,
    page: PageNumber,
    path: &Path,
) -> anyhow::Result<()> {
    let markup = match crawler.cache().get(page) {
        Some(markup) => markup,
        None => match crawler.fetch_markup(page).await {
            Ok(markup) => markup,
            Err(err) => {
                vuls_warn!("No markup to save for page {page}: {err}");
                eprintln!("No markup saved: {err}");
                return Ok(());
            }
        },
    };
    AtomicFileWriter::new(path)
        .write(&markup)
        .with_context(|| format!("saving markup to {}", path.display()))?;
    eprintln!("Saved HTML to {}", path.display());
    Ok(())
}

/// Blocking wrapper used by `main`.
pub fn run_once(crawler: &FeedCrawler, options: &HeadlessOptions) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(list_page(crawler, options, &mut out))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use vuls_engine::{
        ExportMode, FailureKind, FetchError, FetchOutput, Fetcher, PageFetcher, PageSettings,
        TitleCellParser,
    };

    use super::*;

    struct Scripted(Mutex<VecDeque<Result<FetchOutput, FetchError>>>);

    #[async_trait::async_trait]
    impl Fetcher for Scripted {
        async fn fetch(&self, _url: &str) -> Result<FetchOutput, FetchError> {
            self.0.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(FetchError {
                    kind: FailureKind::Network,
                    message: "offline".to_string(),
                })
            })
        }
    }

    fn crawler(script: Vec<Result<FetchOutput, FetchError>>) -> FeedCrawler {
        let fetcher = Arc::new(Scripted(Mutex::new(script.into())));
        FeedCrawler::new(
            PageFetcher::new(fetcher, PageSettings::default()),
            Arc::new(TitleCellParser),
        )
    }

    fn listing() -> Result<FetchOutput, FetchError> {
        let body = r#"<html><body>
            <div class="title tx-overflow-ellipsis"><a href="/vulnerability/ZD-2024-00901">SQL injection in portal</a></div>
            <div class="title tx-overflow-ellipsis"><a href="/vulnerability/ZD-2024-00902">Weak session token</a></div>
        </body></html>"#;
        Ok(FetchOutput {
            status: 200,
            body: body.as_bytes().to_vec(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            final_url: String::new(),
        })
    }

    #[tokio::test]
    async fn prints_lines_and_exports() {
        let dir = TempDir::new().unwrap();
        let export_path = dir.path().join("out").join("vuls.txt");
        let html_path = dir.path().join("output.html");
        let options = HeadlessOptions {
            page: 1,
            export: Some(ExportTarget {
                path: export_path.clone(),
                mode: ExportMode::Overwrite,
                format: ExportFormat::Text,
            }),
            save_html: Some(html_path.clone()),
        };

        let mut out = Vec::new();
        let load = list_page(&crawler(vec![listing()]), &options, &mut out)
            .await
            .unwrap();

        let expected = "https://zeroday.hitcon.org/vulnerability/ZD-2024-00901 SQL injection in portal\n\
                        https://zeroday.hitcon.org/vulnerability/ZD-2024-00902 Weak session token\n";
        assert_eq!(load.source, PageSource::Live);
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        assert_eq!(fs::read_to_string(&export_path).unwrap(), expected);
        assert!(fs::read_to_string(&html_path)
            .unwrap()
            .contains("ZD-2024-00902"));
    }

    #[tokio::test]
    async fn offline_page_lists_demo_entries_without_html() {
        let dir = TempDir::new().unwrap();
        let html_path = dir.path().join("output.html");
        let options = HeadlessOptions {
            page: 3,
            export: None,
            save_html: Some(html_path.clone()),
        };

        let mut out = Vec::new();
        let load = list_page(&crawler(Vec::new()), &options, &mut out)
            .await
            .unwrap();

        assert!(load.degraded);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 20);
        assert!(text.starts_with("https://zeroday.hitcon.org/vulnerability/ZD-2024-00041 [DEMO]"));
        assert!(!html_path.exists());
    }
}
