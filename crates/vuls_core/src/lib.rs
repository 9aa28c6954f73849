//! Vuls core: pure key routing, action dispatch and view-model state.
mod action;
mod effect;
mod error;
mod help;
mod input;
mod key;
mod keymap;
mod msg;
mod router;
mod state;
mod update;
mod view_model;

pub use action::Action;
pub use effect::Effect;
pub use error::{ConfigError, PageInputError};
pub use help::{help_entries, HelpEntry};
pub use input::parse_page_input;
pub use key::KeyToken;
pub use keymap::{
    default_keybindings, KeybindingConfig, Keymap, ModeBindings, DEFAULT_MODE,
    DEFAULT_SEQUENCE_TIMEOUT,
};
pub use msg::Msg;
pub use router::{KeyEventRouter, Resolution};
pub use state::{AppState, EntryRow, Modal, PageNumber, PageSource, RequestId};
pub use update::update;
pub use view_model::{AppViewModel, ModalView, RowView};

/// Page size of the upstream listing.
pub const PAGE_SIZE: usize = 20;

/// Page used by `last_page`; the real page count is not published upstream.
pub const LAST_PAGE_PLACEHOLDER: PageNumber = 100;
