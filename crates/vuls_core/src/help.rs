use crate::{Action, Keymap};

/// Keys shown per action in the help modal.
const MAX_KEYS_SHOWN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub keys: String,
    pub description: &'static str,
}

/// Help lines for every action bound in the active mode, in display order.
pub fn help_entries(keymap: &Keymap) -> Vec<HelpEntry> {
    Action::ALL
        .iter()
        .filter_map(|&action| {
            let keys = keymap.keys_for(action);
            if keys.is_empty() {
                return None;
            }
            let shown = keys
                .iter()
                .take(MAX_KEYS_SHOWN)
                .map(|key| display_key(key))
                .collect::<Vec<_>>()
                .join(", ");
            Some(HelpEntry {
                keys: shown,
                description: action.description(),
            })
        })
        .collect()
}

fn display_key(label: &str) -> String {
    match label {
        " " => "space".to_string(),
        "," => "comma".to_string(),
        other => other.replace(',', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_first_three_keys() {
        let entries = help_entries(&Keymap::builtin());
        let next = entries
            .iter()
            .find(|entry| entry.description == "Next page")
            .unwrap();
        assert_eq!(next.keys, "ctrl+f, pagedown, d");

        let first = entries
            .iter()
            .find(|entry| entry.description == "Jump to first page")
            .unwrap();
        assert_eq!(first.keys, "g g");
    }

    #[test]
    fn unbound_actions_are_omitted() {
        let entries = help_entries(&Keymap::empty("bare"));
        assert!(entries.is_empty());
    }
}
