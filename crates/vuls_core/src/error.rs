use thiserror::Error;

use crate::Action;

/// Malformed or conflicting keybinding configuration. Fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("keybinding mode `{mode}` is not defined")]
    UnknownMode { mode: String },
    #[error("mode `{mode}`: action `{action}` has an empty key binding")]
    EmptyKey { mode: String, action: &'static str },
    #[error("mode `{mode}`: key `{key}` is bound to both `{first}` and `{second}`")]
    DuplicateBinding {
        mode: String,
        key: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("mode `{mode}`: key `{key}` is bound to `{action}` but is also a sequence prefix")]
    PrefixConflict {
        mode: String,
        key: String,
        action: &'static str,
    },
    #[error("mode `{mode}`: binding `{binding}` for `{action}` must be one key or a two-key sequence")]
    UnsupportedSequence {
        mode: String,
        action: &'static str,
        binding: String,
    },
    #[error("key sequence timeout must be greater than zero")]
    ZeroTimeout,
}

impl ConfigError {
    pub(crate) fn duplicate(mode: &str, key: impl Into<String>, first: Action, second: Action) -> Self {
        ConfigError::DuplicateBinding {
            mode: mode.to_string(),
            key: key.into(),
            first: first.name(),
            second: second.name(),
        }
    }
}

/// Rejected page-jump input. Recovered silently by clearing the prompt.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PageInputError {
    #[error("no page number entered")]
    Empty,
    #[error("page number is not numeric")]
    NotANumber,
    #[error("page number must be positive")]
    NotPositive,
}
