use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use vuls_core::KeyToken;

/// Translates a terminal key press into the configuration vocabulary.
/// Releases, repeats of non-press kinds and unsupported keys yield `None`.
pub fn key_token(event: &KeyEvent) -> Option<KeyToken> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let name = match event.code {
        KeyCode::Char(c) => {
            if !ctrl && !alt {
                // Shift is already reflected in the character itself.
                return Some(KeyToken::from_char(c));
            }
            c.to_string()
        }
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => return KeyToken::parse("shift+tab"),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };

    let mut raw = String::new();
    if ctrl {
        raw.push_str("ctrl+");
    }
    if alt {
        raw.push_str("alt+");
    }
    if shift && !matches!(event.code, KeyCode::Char(_)) {
        raw.push_str("shift+");
    }
    raw.push_str(&name);
    KeyToken::parse(&raw)
}
