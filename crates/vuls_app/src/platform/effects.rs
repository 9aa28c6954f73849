use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use vuls_core::{Effect, EntryRow, Msg, PageSource};
use vuls_engine::{
    export_entries, EngineEvent, EngineHandle, ExportFormat, ExportMode, PageLoad,
    VulnerabilityEntry,
};
use vuls_logging::{vuls_debug, vuls_info, vuls_warn};

use super::browser::open_url_in_browser;

/// Where the export action writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub mode: ExportMode,
    pub format: ExportFormat,
}

impl Default for ExportTarget {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vuls.txt"),
            mode: ExportMode::Overwrite,
            format: ExportFormat::Text,
        }
    }
}

/// Carries core effects out to the engine, the browser and the filesystem,
/// and feeds engine results back in as messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    export: ExportTarget,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, export: ExportTarget, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self {
            engine: Arc::new(engine),
            export,
            msg_tx,
        };
        runner.spawn_event_loop();
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadPage { request, page } => {
                    vuls_debug!("LoadPage request={request} page={page}");
                    self.engine.load(request, page);
                }
                Effect::RefreshPage { request, page } => {
                    vuls_info!("Refreshing page {page}");
                    self.engine.refresh(request, page);
                }
                Effect::OpenBrowser { url } => {
                    let notice = match open_url_in_browser(&url) {
                        Ok(()) => format!("Opened {url}"),
                        Err(err) => {
                            vuls_warn!("Could not open {url}: {err}");
                            format!("Could not open browser: {err}")
                        }
                    };
                    let _ = self.msg_tx.send(Msg::Notice(notice));
                }
                Effect::ExportRows { page, rows } => {
                    let _ = self.msg_tx.send(Msg::Notice(self.export_rows(page, &rows)));
                }
                Effect::Quit => {
                    // The UI loop observes the quit flag on the state.
                }
            }
        }
    }

    fn export_rows(&self, page: u32, rows: &[EntryRow]) -> String {
        let base_origin = &self.engine.crawler().page_settings().base_origin;
        let entries: Vec<VulnerabilityEntry> = rows
            .iter()
            .map(|row| VulnerabilityEntry::new(base_origin, row.path.clone(), row.title.clone()))
            .collect();
        match export_entries(
            &self.export.path,
            &entries,
            self.export.mode,
            self.export.format,
        ) {
            Ok(count) => format!(
                "Exported {count} entries of page {page} to {}",
                self.export.path.display()
            ),
            Err(err) => {
                vuls_warn!("Export of page {page} failed: {err}");
                format!("Export failed: {err}")
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            if let Some(EngineEvent::PageLoaded { request, load }) =
                engine.recv_timeout(Duration::from_millis(50))
            {
                if msg_tx.send(page_loaded(request, load)).is_err() {
                    break;
                }
            }
        });
    }
}

/// Maps an engine result onto the core message; the only seam between the
/// two crates' types.
pub fn page_loaded(request: u64, load: PageLoad) -> Msg {
    if let Some(err) = &load.last_error {
        vuls_debug!("Page {} served while degraded: {err}", load.page);
    }
    Msg::PageLoaded {
        request,
        page: load.page,
        rows: load.entries.into_iter().map(entry_row).collect(),
        source: map_source(load.source),
        degraded: load.degraded,
        last_error: load.last_error.map(|err| err.to_string()),
    }
}

fn entry_row(entry: VulnerabilityEntry) -> EntryRow {
    EntryRow {
        path: entry.path().to_string(),
        title: entry.title().to_string(),
        url: entry.canonical_url().to_string(),
    }
}

fn map_source(source: vuls_engine::PageSource) -> PageSource {
    match source {
        vuls_engine::PageSource::Live => PageSource::Live,
        vuls_engine::PageSource::Cached => PageSource::Cached,
        vuls_engine::PageSource::Demo => PageSource::Demo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vuls_engine::{synthesize_demo, CrawlError, DEFAULT_BASE_ORIGIN};

    #[test]
    fn demo_load_maps_to_degraded_message() {
        let load = PageLoad {
            page: 2,
            entries: synthesize_demo(2, DEFAULT_BASE_ORIGIN),
            source: vuls_engine::PageSource::Demo,
            degraded: true,
            last_error: Some(CrawlError::EmptyResult { page: 2 }),
        };
        match page_loaded(9, load) {
            Msg::PageLoaded {
                request,
                page,
                rows,
                source,
                degraded,
                last_error,
            } => {
                assert_eq!((request, page, source, degraded), (9, 2, PageSource::Demo, true));
                assert_eq!(rows.len(), 20);
                assert_eq!(
                    rows[0].url,
                    "https://zeroday.hitcon.org/vulnerability/ZD-2024-00021"
                );
                assert_eq!(
                    last_error.as_deref(),
                    Some("page 2 contained no recognisable entries")
                );
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
