use serde::{Deserialize, Serialize};

/// Named operation a key binding resolves to.
///
/// Configuration files may use the short legacy names (`down`, `page_up`, ...)
/// which deserialize to the same variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[serde(alias = "down")]
    MoveDown,
    #[serde(alias = "up")]
    MoveUp,
    #[serde(alias = "page_down")]
    NextPage,
    #[serde(alias = "page_up")]
    PrevPage,
    FirstPage,
    LastPage,
    JumpToPage,
    #[serde(alias = "refresh_page")]
    Refresh,
    #[serde(alias = "show_help")]
    Help,
    #[serde(alias = "quit_app")]
    Quit,
    #[serde(alias = "open_url")]
    OpenBrowser,
    Export,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::MoveDown,
        Action::MoveUp,
        Action::NextPage,
        Action::PrevPage,
        Action::FirstPage,
        Action::LastPage,
        Action::JumpToPage,
        Action::Refresh,
        Action::Help,
        Action::Quit,
        Action::OpenBrowser,
        Action::Export,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::MoveDown => "move_down",
            Action::MoveUp => "move_up",
            Action::NextPage => "next_page",
            Action::PrevPage => "prev_page",
            Action::FirstPage => "first_page",
            Action::LastPage => "last_page",
            Action::JumpToPage => "jump_to_page",
            Action::Refresh => "refresh",
            Action::Help => "help",
            Action::Quit => "quit",
            Action::OpenBrowser => "open_browser",
            Action::Export => "export",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::MoveDown => "Move down one item",
            Action::MoveUp => "Move up one item",
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::FirstPage => "Jump to first page",
            Action::LastPage => "Jump to last page",
            Action::JumpToPage => "Jump to specific page",
            Action::Refresh => "Refresh current page",
            Action::Help => "Show this help",
            Action::Quit => "Quit application",
            Action::OpenBrowser => "Open selected entry in browser",
            Action::Export => "Export current page to file",
        }
    }
}
