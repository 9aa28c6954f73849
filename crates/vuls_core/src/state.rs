use crate::view_model::{AppViewModel, ModalView, RowView};
use crate::{help_entries, KeyEventRouter, LAST_PAGE_PLACEHOLDER};

pub type PageNumber = u32;
pub type RequestId = u64;

/// One listing row as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub path: String,
    pub title: String,
    pub url: String,
}

/// Where the rows of the current page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Live,
    Cached,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Help,
    JumpPrompt { input: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    router: KeyEventRouter,
    last_page: PageNumber,
    page: PageNumber,
    rows: Vec<EntryRow>,
    cursor: Option<usize>,
    loading: bool,
    source: Option<PageSource>,
    degraded: bool,
    last_error: Option<String>,
    modal: Option<Modal>,
    in_flight: Option<RequestId>,
    next_request: RequestId,
    notice: Option<String>,
    quit: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(KeyEventRouter::default())
    }
}

impl AppState {
    pub fn new(router: KeyEventRouter) -> Self {
        Self {
            router,
            last_page: LAST_PAGE_PLACEHOLDER,
            page: 1,
            rows: Vec::new(),
            cursor: None,
            loading: false,
            source: None,
            degraded: false,
            last_error: None,
            modal: None,
            in_flight: None,
            next_request: 1,
            notice: None,
            quit: false,
            dirty: true,
        }
    }

    /// Page that `last_page` jumps to.
    pub fn with_last_page(mut self, page: PageNumber) -> Self {
        self.last_page = page.max(1);
        self
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| RowView {
                index: idx + 1,
                title: row.title.clone(),
                url: row.url.clone(),
            })
            .collect();
        let modal = self.modal.as_ref().map(|modal| match modal {
            Modal::Help => ModalView::Help {
                entries: help_entries(self.router.keymap()),
            },
            Modal::JumpPrompt { input } => ModalView::JumpPrompt {
                input: input.clone(),
            },
        });

        AppViewModel {
            mode: self.router.keymap().mode().to_string(),
            page: self.page,
            rows,
            cursor: self.cursor,
            loading: self.loading,
            source: self.source,
            degraded: self.degraded,
            last_error: self.last_error.clone(),
            pending_key: self.router.pending_prefix().map(|key| key.to_string()),
            notice: self.notice.clone(),
            modal,
            dirty: self.dirty,
        }
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn rows(&self) -> &[EntryRow] {
        &self.rows
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn selected(&self) -> Option<&EntryRow> {
        self.cursor.and_then(|idx| self.rows.get(idx))
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn router(&self) -> &KeyEventRouter {
        &self.router
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn router_mut(&mut self) -> &mut KeyEventRouter {
        &mut self.router
    }

    pub(crate) fn last_page(&self) -> PageNumber {
        self.last_page
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks `page` as loading and hands out the request id whose result will
    /// be accepted. Earlier requests become stale.
    pub(crate) fn begin_request(&mut self, page: PageNumber) -> RequestId {
        let request = self.next_request;
        self.next_request += 1;
        self.page = page;
        self.loading = true;
        self.in_flight = Some(request);
        self.notice = None;
        self.mark_dirty();
        request
    }

    /// Applies a finished load. Returns `false` if the result is stale.
    pub(crate) fn finish_request(
        &mut self,
        request: RequestId,
        rows: Vec<EntryRow>,
        source: PageSource,
        degraded: bool,
        last_error: Option<String>,
    ) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        self.loading = false;
        self.cursor = if rows.is_empty() { None } else { Some(0) };
        self.rows = rows;
        self.source = Some(source);
        self.degraded = degraded;
        self.last_error = last_error;
        self.mark_dirty();
        true
    }

    pub(crate) fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = None;
            return;
        }
        let max = self.rows.len() - 1;
        let current = self.cursor.unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(max);
        if self.cursor != Some(next) {
            self.cursor = Some(next);
            self.mark_dirty();
        }
    }

    pub(crate) fn open_modal(&mut self, modal: Modal) {
        self.router.reset();
        self.modal = Some(modal);
        self.mark_dirty();
    }

    pub(crate) fn close_modal(&mut self) {
        self.modal = None;
        self.mark_dirty();
    }

    pub(crate) fn jump_input_mut(&mut self) -> Option<&mut String> {
        match self.modal.as_mut() {
            Some(Modal::JumpPrompt { input }) => Some(input),
            _ => None,
        }
    }

    pub(crate) fn set_notice(&mut self, notice: String) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn request_quit(&mut self) {
        self.quit = true;
        self.mark_dirty();
    }
}
