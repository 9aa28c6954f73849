use crate::{HelpEntry, PageNumber, PageSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub mode: String,
    pub page: PageNumber,
    pub rows: Vec<RowView>,
    pub cursor: Option<usize>,
    pub loading: bool,
    pub source: Option<PageSource>,
    pub degraded: bool,
    pub last_error: Option<String>,
    /// First key of a sequence waiting for its second key.
    pub pending_key: Option<String>,
    pub notice: Option<String>,
    pub modal: Option<ModalView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// 1-based position on the page.
    pub index: usize,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Help { entries: Vec<HelpEntry> },
    JumpPrompt { input: String },
}

impl AppViewModel {
    /// One-line status summary, e.g. `Page: 3 | Vulnerabilities: 20 | DEMO`.
    pub fn status_line(&self) -> String {
        if self.loading {
            return format!("Loading page {}...", self.page);
        }
        let mut status = format!(
            "Page: {} | Vulnerabilities: {}",
            self.page,
            self.rows.len()
        );
        if self.degraded {
            status.push_str(" | DEMO");
        } else if self.source == Some(PageSource::Cached) {
            status.push_str(" | cached");
        }
        if let Some(key) = &self.pending_key {
            status.push_str(&format!(" | {key}-"));
        }
        if let Some(notice) = &self.notice {
            status.push_str(&format!(" | {notice}"));
        }
        status
    }
}
