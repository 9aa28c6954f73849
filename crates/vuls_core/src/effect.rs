use crate::{EntryRow, PageNumber, RequestId};

/// Side effects requested by [`crate::update`], executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load a page, from cache when possible.
    LoadPage { request: RequestId, page: PageNumber },
    /// Drop the cached copy of a page and fetch it again.
    RefreshPage { request: RequestId, page: PageNumber },
    OpenBrowser { url: String },
    ExportRows { page: PageNumber, rows: Vec<EntryRow> },
    Quit,
}
