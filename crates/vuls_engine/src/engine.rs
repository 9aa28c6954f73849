use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use vuls_logging::vuls_debug;

use crate::{EngineEvent, FeedCrawler, PageNumber, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Load { request: RequestId, page: PageNumber },
    Refresh { request: RequestId, page: PageNumber },
    ClearCache,
    ResetDegraded,
}

/// Runs crawler work on a background tokio runtime so key handling never
/// waits on the network.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
    crawler: Arc<FeedCrawler>,
}

impl EngineHandle {
    pub fn new(crawler: Arc<FeedCrawler>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("vuls-engine")
            .build()?;

        let worker = crawler.clone();
        thread::Builder::new()
            .name("vuls-engine-commands".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let crawler = worker.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(&crawler, command, event_tx).await;
                    });
                }
                vuls_debug!("Engine command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
            crawler,
        })
    }

    pub fn crawler(&self) -> &Arc<FeedCrawler> {
        &self.crawler
    }

    pub fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn load(&self, request: RequestId, page: PageNumber) {
        self.send(EngineCommand::Load { request, page });
    }

    pub fn refresh(&self, request: RequestId, page: PageNumber) {
        self.send(EngineCommand::Refresh { request, page });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    crawler: &FeedCrawler,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Load { request, page } => {
            let load = crawler.load_page(page).await;
            let _ = event_tx.send(EngineEvent::PageLoaded { request, load });
        }
        EngineCommand::Refresh { request, page } => {
            let load = crawler.refresh(page).await;
            let _ = event_tx.send(EngineEvent::PageLoaded { request, load });
        }
        EngineCommand::ClearCache => crawler.clear_cache(),
        EngineCommand::ResetDegraded => crawler.reset_degraded(),
    }
}
