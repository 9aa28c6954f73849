use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::{Action, ConfigError, KeyToken};

/// `action -> [key names]` for one mode, as written in the configuration file.
pub type ModeBindings = BTreeMap<Action, Vec<String>>;
/// `mode -> action -> [key names]`.
pub type KeybindingConfig = BTreeMap<String, ModeBindings>;

pub const DEFAULT_MODE: &str = "vim_mode";
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(500);

const SEQUENCE_SEPARATOR: char = ',';

/// Built-in keybinding profiles.
pub fn default_keybindings() -> KeybindingConfig {
    let vim: &[(Action, &[&str])] = &[
        (Action::MoveDown, &["j", "down"]),
        (Action::MoveUp, &["k", "up"]),
        (Action::NextPage, &["ctrl+f", "pagedown", "d", "l"]),
        (Action::PrevPage, &["ctrl+b", "pageup", "u", "h"]),
        (Action::FirstPage, &["g,g"]),
        (Action::LastPage, &["G"]),
        (Action::JumpToPage, &["/", ":"]),
        (Action::Refresh, &["r"]),
        (Action::Help, &["?", "f1"]),
        (Action::Quit, &["q", "escape"]),
        (Action::OpenBrowser, &["o", "enter"]),
        (Action::Export, &["e"]),
    ];
    let arrows: &[(Action, &[&str])] = &[
        (Action::MoveDown, &["down"]),
        (Action::MoveUp, &["up"]),
        (Action::NextPage, &["pagedown", "right"]),
        (Action::PrevPage, &["pageup", "left"]),
        (Action::FirstPage, &["home"]),
        (Action::LastPage, &["end"]),
        (Action::JumpToPage, &["ctrl+g"]),
        (Action::Refresh, &["f5"]),
        (Action::Help, &["f1"]),
        (Action::Quit, &["escape", "ctrl+q"]),
        (Action::OpenBrowser, &["enter"]),
        (Action::Export, &["ctrl+s"]),
    ];

    let to_mode = |table: &[(Action, &[&str])]| -> ModeBindings {
        table
            .iter()
            .map(|(action, keys)| (*action, keys.iter().map(|k| k.to_string()).collect()))
            .collect()
    };

    let mut config = KeybindingConfig::new();
    config.insert(DEFAULT_MODE.to_string(), to_mode(vim));
    config.insert("arrow_mode".to_string(), to_mode(arrows));
    config
}

/// Validated bindings for exactly one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    mode: String,
    singles: HashMap<KeyToken, Action>,
    sequences: HashMap<KeyToken, HashMap<KeyToken, Action>>,
    labels: BTreeMap<Action, Vec<String>>,
}

impl Keymap {
    /// Selects `mode` from the configuration and validates it.
    pub fn for_mode(config: &KeybindingConfig, mode: &str) -> Result<Self, ConfigError> {
        let bindings = config.get(mode).ok_or_else(|| ConfigError::UnknownMode {
            mode: mode.to_string(),
        })?;
        Self::from_bindings(mode, bindings)
    }

    /// The built-in vim profile.
    pub fn builtin() -> Self {
        let config = default_keybindings();
        Self::for_mode(&config, DEFAULT_MODE).unwrap_or_else(|_| Self::empty(DEFAULT_MODE))
    }

    pub fn empty(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            singles: HashMap::new(),
            sequences: HashMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn from_bindings(mode: &str, bindings: &ModeBindings) -> Result<Self, ConfigError> {
        let mut keymap = Self::empty(mode);

        for (&action, keys) in bindings {
            for raw in keys {
                match parse_binding(mode, action, raw)? {
                    Binding::Single(token) => keymap.bind_single(token, action)?,
                    Binding::Sequence(prefix, next) => {
                        keymap.bind_sequence(prefix, next, action)?
                    }
                }
            }
        }

        for prefix in keymap.sequences.keys() {
            if let Some(action) = keymap.singles.get(prefix) {
                return Err(ConfigError::PrefixConflict {
                    mode: mode.to_string(),
                    key: prefix.to_string(),
                    action: action.name(),
                });
            }
        }

        Ok(keymap)
    }

    fn bind_single(&mut self, token: KeyToken, action: Action) -> Result<(), ConfigError> {
        if let Some(existing) = self.singles.get(&token) {
            if *existing != action {
                return Err(ConfigError::duplicate(&self.mode, token.as_str(), *existing, action));
            }
            return Ok(());
        }
        self.push_label(action, token.to_string());
        self.singles.insert(token, action);
        Ok(())
    }

    fn bind_sequence(
        &mut self,
        prefix: KeyToken,
        next: KeyToken,
        action: Action,
    ) -> Result<(), ConfigError> {
        let label = format!("{prefix}{SEQUENCE_SEPARATOR}{next}");
        let followers = self.sequences.entry(prefix).or_default();
        if let Some(existing) = followers.get(&next) {
            if *existing != action {
                return Err(ConfigError::duplicate(&self.mode, label, *existing, action));
            }
            return Ok(());
        }
        followers.insert(next, action);
        self.push_label(action, label);
        Ok(())
    }

    fn push_label(&mut self, action: Action, label: String) {
        self.labels.entry(action).or_default().push(label);
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Action bound to a single key press.
    pub fn single(&self, token: &KeyToken) -> Option<Action> {
        self.singles.get(token).copied()
    }

    /// Whether `token` starts a two-key sequence.
    pub fn is_prefix(&self, token: &KeyToken) -> bool {
        self.sequences.contains_key(token)
    }

    /// Action bound to `prefix` followed by `next`.
    pub fn sequence(&self, prefix: &KeyToken, next: &KeyToken) -> Option<Action> {
        self.sequences
            .get(prefix)
            .and_then(|followers| followers.get(next))
            .copied()
    }

    /// Normalised key labels bound to `action`, in configuration order.
    pub fn keys_for(&self, action: Action) -> &[String] {
        self.labels.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

enum Binding {
    Single(KeyToken),
    Sequence(KeyToken, KeyToken),
}

fn parse_binding(mode: &str, action: Action, raw: &str) -> Result<Binding, ConfigError> {
    let empty = || ConfigError::EmptyKey {
        mode: mode.to_string(),
        action: action.name(),
    };

    // A lone separator binds the comma key itself.
    if raw.trim() == "," {
        return Ok(Binding::Single(KeyToken::from_char(',')));
    }
    if !raw.contains(SEQUENCE_SEPARATOR) {
        return KeyToken::parse(raw).map(Binding::Single).ok_or_else(empty);
    }

    let parts: Vec<&str> = raw.split(SEQUENCE_SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(ConfigError::UnsupportedSequence {
            mode: mode.to_string(),
            action: action.name(),
            binding: raw.to_string(),
        });
    }
    let prefix = KeyToken::parse(parts[0]).ok_or_else(empty)?;
    let next = KeyToken::parse(parts[1]).ok_or_else(empty)?;
    Ok(Binding::Sequence(prefix, next))
}
