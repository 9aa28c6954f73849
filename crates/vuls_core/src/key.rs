use std::fmt;

/// One discrete key press, normalised to the configuration vocabulary.
///
/// Printable characters keep their case (`g` and `G` differ), named keys are
/// lowercase (`down`, `escape`, `f1`) and modifier combinations collapse into
/// a single token such as `ctrl+f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyToken(String);

const MODIFIER_ORDER: [&str; 3] = ["ctrl", "alt", "shift"];

impl KeyToken {
    /// Parses a configured or captured key name. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == " " {
            return Some(Self(" ".to_string()));
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let (modifiers, key) = split_modifiers(raw);
        let key = normalize_key(key, !modifiers.is_empty())?;
        if modifiers.is_empty() {
            return Some(Self(key));
        }
        Some(Self(format!("{}+{}", modifiers.join("+"), key)))
    }

    /// Token for a printable character without modifiers.
    pub fn from_char(c: char) -> Self {
        Self(c.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The character this token types, if it is an unmodified printable key.
    pub fn as_char(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn split_modifiers(raw: &str) -> (Vec<&'static str>, &str) {
    if raw.chars().count() == 1 || !raw.contains('+') {
        return (Vec::new(), raw);
    }

    let (prefix, key) = match raw.rsplit_once('+') {
        // "ctrl++" binds the plus key itself.
        Some((prefix, "")) => (prefix.strip_suffix('+').unwrap_or(prefix), "+"),
        Some((prefix, key)) => (prefix, key),
        None => return (Vec::new(), raw),
    };

    let mut modifiers = Vec::new();
    for part in prefix.split('+') {
        let canonical = match part.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => "ctrl",
            "alt" | "meta" | "option" => "alt",
            "shift" => "shift",
            _ => return (Vec::new(), raw),
        };
        if !modifiers.contains(&canonical) {
            modifiers.push(canonical);
        }
    }
    modifiers.sort_by_key(|m| MODIFIER_ORDER.iter().position(|o| o == m));
    (modifiers, key)
}

fn normalize_key(key: &str, modified: bool) -> Option<String> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Terminals report ctrl+F and ctrl+f identically.
        if modified {
            return Some(c.to_lowercase().collect());
        }
        return Some(c.to_string());
    }

    let lower = key.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }
    let named = match lower.as_str() {
        "question" | "question_mark" => "?",
        "colon" => ":",
        "slash" => "/",
        "space" => " ",
        "esc" => "escape",
        "return" => "enter",
        "page_down" | "pgdn" => "pagedown",
        "page_up" | "pgup" => "pageup",
        "del" => "delete",
        "ins" => "insert",
        other => other,
    };
    Some(named.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> String {
        KeyToken::parse(raw).unwrap().as_str().to_string()
    }

    #[test]
    fn printable_keys_keep_case() {
        assert_eq!(token("g"), "g");
        assert_eq!(token("G"), "G");
        assert_ne!(KeyToken::parse("g"), KeyToken::parse("G"));
    }

    #[test]
    fn legacy_names_are_normalized() {
        assert_eq!(token("question"), "?");
        assert_eq!(token("colon"), ":");
        assert_eq!(token("Escape"), "escape");
        assert_eq!(token("esc"), "escape");
        assert_eq!(token("page_down"), "pagedown");
        assert_eq!(token("F1"), "f1");
    }

    #[test]
    fn modifiers_collapse_into_one_token() {
        assert_eq!(token("ctrl+f"), "ctrl+f");
        assert_eq!(token("Ctrl+F"), "ctrl+f");
        assert_eq!(token("alt+ctrl+x"), "ctrl+alt+x");
        assert_eq!(token("ctrl++"), "ctrl++");
        assert_eq!(token("+"), "+");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(KeyToken::parse(""), None);
        assert_eq!(KeyToken::parse("   "), None);
        assert_eq!(token(" "), " ");
    }

    #[test]
    fn as_char_only_for_plain_printables() {
        assert_eq!(KeyToken::from_char('4').as_char(), Some('4'));
        assert_eq!(KeyToken::parse("down").unwrap().as_char(), None);
        assert_eq!(KeyToken::parse("ctrl+f").unwrap().as_char(), None);
    }
}
