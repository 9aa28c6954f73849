use std::time::Instant;

use crate::{EntryRow, KeyToken, PageNumber, PageSource, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Application started; load the initial page.
    Started { page: PageNumber },
    /// One key press from the terminal, stamped with a monotonic time.
    Key { token: KeyToken, at: Instant },
    /// Engine finished a load or refresh.
    PageLoaded {
        request: RequestId,
        page: PageNumber,
        rows: Vec<EntryRow>,
        source: PageSource,
        degraded: bool,
        last_error: Option<String>,
    },
    /// Transient message for the status bar (export results, browser errors).
    Notice(String),
    /// Periodic redraw tick; also expires a stale key prefix.
    Tick { at: Instant },
}
