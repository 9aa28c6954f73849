use std::sync::Once;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use vuls_core::{
    update, AppState, Effect, EntryRow, KeyToken, Modal, ModalView, Msg, PageSource,
    LAST_PAGE_PLACEHOLDER,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(vuls_logging::initialize_for_tests);
}

fn press(state: AppState, raw: &str) -> (AppState, Vec<Effect>) {
    press_at(state, raw, Instant::now())
}

fn press_at(state: AppState, raw: &str, at: Instant) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::Key {
            token: KeyToken::parse(raw).expect("valid key"),
            at,
        },
    )
}

fn type_text(mut state: AppState, text: &str) -> AppState {
    for c in text.chars() {
        let (next, _) = update(
            state,
            Msg::Key {
                token: KeyToken::from_char(c),
                at: Instant::now(),
            },
        );
        state = next;
    }
    state
}

fn rows(count: usize) -> Vec<EntryRow> {
    (1..=count)
        .map(|i| EntryRow {
            path: format!("/vulnerability/ZD-2024-{i:05}"),
            title: format!("entry {i}"),
            url: format!("https://zeroday.hitcon.org/vulnerability/ZD-2024-{i:05}"),
        })
        .collect()
}

fn request_of(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::LoadPage { request, .. } | Effect::RefreshPage { request, .. } => {
                Some(*request)
            }
            _ => None,
        })
        .expect("load effect")
}

/// Starts on page 1 and completes the load with `count` live rows.
fn loaded_state(count: usize) -> AppState {
    let (state, effects) = update(AppState::new(Default::default()), Msg::Started { page: 1 });
    let request = request_of(&effects);
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request,
            page: 1,
            rows: rows(count),
            source: PageSource::Live,
            degraded: false,
            last_error: None,
        },
    );
    state
}

#[test]
fn start_requests_initial_page() {
    init_logging();
    let (state, effects) = update(AppState::default(), Msg::Started { page: 3 });
    assert_eq!(effects, vec![Effect::LoadPage { request: 1, page: 3 }]);
    assert!(state.is_loading());
    assert_eq!(state.view().status_line(), "Loading page 3...");
}

#[test]
fn page_navigation_emits_loads() {
    init_logging();
    let state = loaded_state(20);

    let (state, effects) = press(state, "d");
    assert_eq!(effects, vec![Effect::LoadPage { request: 2, page: 2 }]);
    assert_eq!(state.page(), 2);

    let (state, effects) = press(state, "u");
    assert_eq!(effects, vec![Effect::LoadPage { request: 3, page: 1 }]);

    let (state, effects) = press(state, "G");
    assert_eq!(
        effects,
        vec![Effect::LoadPage {
            request: 4,
            page: LAST_PAGE_PLACEHOLDER
        }]
    );

    let now = Instant::now();
    let (state, effects) = press_at(state, "g", now);
    assert!(effects.is_empty());
    let (state, effects) = press_at(state, "g", now + Duration::from_millis(200));
    assert_eq!(effects, vec![Effect::LoadPage { request: 5, page: 1 }]);
    assert_eq!(state.page(), 1);
}

#[test]
fn prev_page_on_first_page_is_noop() {
    init_logging();
    let state = loaded_state(20);
    let (state, effects) = press(state, "u");
    assert!(effects.is_empty());
    assert_eq!(state.page(), 1);
}

#[test]
fn last_page_placeholder_is_configurable() {
    init_logging();
    let state = AppState::default().with_last_page(250);
    let (_, effects) = press(state, "G");
    assert_eq!(effects, vec![Effect::LoadPage { request: 1, page: 250 }]);
}

#[test]
fn cursor_moves_and_clamps() {
    init_logging();
    let state = loaded_state(3);
    assert_eq!(state.cursor(), Some(0));

    let (state, _) = press(state, "k");
    assert_eq!(state.cursor(), Some(0));
    let (state, _) = press(state, "j");
    let (state, _) = press(state, "down");
    let (state, _) = press(state, "j");
    assert_eq!(state.cursor(), Some(2));
    let (state, _) = press(state, "up");
    assert_eq!(state.cursor(), Some(1));
}

#[test]
fn stale_page_result_is_discarded() {
    init_logging();
    let state = loaded_state(20);
    let (state, first) = press(state, "d");
    let (state, second) = press(state, "d");
    let stale = request_of(&first);
    let latest = request_of(&second);

    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request: stale,
            page: 2,
            rows: rows(1),
            source: PageSource::Live,
            degraded: false,
            last_error: None,
        },
    );
    assert!(state.is_loading());
    assert_eq!(state.rows().len(), 20);

    let (state, _) = update(
        state,
        Msg::PageLoaded {
            request: latest,
            page: 3,
            rows: rows(5),
            source: PageSource::Demo,
            degraded: true,
            last_error: Some("access denied (403)".to_string()),
        },
    );
    assert!(!state.is_loading());
    assert_eq!(state.page(), 3);
    assert_eq!(state.rows().len(), 5);
    assert!(state.is_degraded());
    assert_eq!(state.view().status_line(), "Page: 3 | Vulnerabilities: 5 | DEMO");
}

#[test]
fn jump_to_page_accepts_positive_number() {
    init_logging();
    let state = loaded_state(20);
    let (state, effects) = press(state, "/");
    assert!(effects.is_empty());
    assert_eq!(
        state.modal(),
        Some(&Modal::JumpPrompt {
            input: String::new()
        })
    );

    let state = type_text(state, "42");
    let (state, effects) = press(state, "enter");
    assert_eq!(effects, vec![Effect::LoadPage { request: 2, page: 42 }]);
    assert_eq!(state.modal(), None);
    assert_eq!(state.page(), 42);
}

#[test]
fn jump_to_page_rejects_invalid_input_silently() {
    init_logging();
    for bad in ["-5", "abc", ""] {
        let state = loaded_state(20);
        let (state, _) = press(state, ":");
        let state = type_text(state, bad);
        let (state, effects) = press(state, "enter");
        assert!(effects.is_empty(), "input {bad:?} must be rejected");
        assert_eq!(
            state.modal(),
            Some(&Modal::JumpPrompt {
                input: String::new()
            })
        );
        assert_eq!(state.page(), 1);
    }
}

#[test]
fn jump_prompt_swallows_bound_keys_and_supports_editing() {
    init_logging();
    let state = loaded_state(20);
    let (state, _) = press(state, "/");
    let state = type_text(state, "q7");
    let (state, _) = press(state, "backspace");
    let (state, _) = press(state, "backspace");
    let state = type_text(state, "9");
    assert!(!state.should_quit());
    assert_eq!(
        state.view().modal,
        Some(ModalView::JumpPrompt {
            input: "9".to_string()
        })
    );

    let (state, effects) = press(state, "escape");
    assert!(effects.is_empty());
    assert_eq!(state.modal(), None);
    assert_eq!(state.page(), 1);
}

#[test]
fn help_modal_opens_and_closes() {
    init_logging();
    let state = loaded_state(20);
    let (state, _) = press(state, "?");
    match state.view().modal {
        Some(ModalView::Help { entries }) => {
            assert!(entries.iter().any(|e| e.description == "Quit application"));
        }
        other => panic!("expected help modal, got {other:?}"),
    }

    // Navigation keys are swallowed while help is open.
    let (state, effects) = press(state, "d");
    assert!(effects.is_empty());
    let (state, effects) = press(state, "q");
    assert!(effects.is_empty());
    assert_eq!(state.modal(), None);
    assert!(!state.should_quit());
}

#[test]
fn opening_modal_clears_pending_prefix() {
    init_logging();
    let state = loaded_state(20);
    let now = Instant::now();
    let (state, _) = press_at(state, "g", now);
    assert_eq!(state.view().pending_key.as_deref(), Some("g"));
    let (state, _) = press_at(state, "f1", now + Duration::from_millis(10));
    let (state, _) = press_at(state, "escape", now + Duration::from_millis(20));
    let (_, effects) = press_at(state, "g", now + Duration::from_millis(30));
    assert!(effects.is_empty());
}

#[test]
fn open_browser_requires_selection() {
    init_logging();
    let (state, effects) = press(AppState::default(), "o");
    assert!(effects.is_empty());
    drop(state);

    let state = loaded_state(3);
    let (state, _) = press(state, "j");
    let (_, effects) = press(state, "enter");
    assert_eq!(
        effects,
        vec![Effect::OpenBrowser {
            url: "https://zeroday.hitcon.org/vulnerability/ZD-2024-00002".to_string()
        }]
    );
}

#[test]
fn refresh_requests_current_page() {
    init_logging();
    let state = loaded_state(20);
    let (state, _) = press(state, "d");
    let (state, effects) = press(state, "r");
    assert_eq!(effects, vec![Effect::RefreshPage { request: 3, page: 2 }]);
    assert!(state.is_loading());
}

#[test]
fn export_sends_current_rows() {
    init_logging();
    let (_, effects) = press(AppState::default(), "e");
    assert!(effects.is_empty());

    let state = loaded_state(2);
    let (_, effects) = press(state, "e");
    assert_eq!(
        effects,
        vec![Effect::ExportRows {
            page: 1,
            rows: rows(2)
        }]
    );
}

#[test]
fn quit_sets_flag_and_emits_effect() {
    init_logging();
    let (state, effects) = press(AppState::default(), "q");
    assert_eq!(effects, vec![Effect::Quit]);
    assert!(state.should_quit());
}

#[test]
fn notice_is_shown_until_next_load() {
    init_logging();
    let state = loaded_state(2);
    let (state, _) = update(state, Msg::Notice("Exported 2 entries".to_string()));
    assert_eq!(
        state.view().status_line(),
        "Page: 1 | Vulnerabilities: 2 | Exported 2 entries"
    );
    let (state, _) = press(state, "d");
    assert_eq!(state.view().notice, None);
}

#[test]
fn tick_clears_expired_prefix_from_status_line() {
    init_logging();
    let state = loaded_state(20);
    let now = Instant::now();
    let (state, _) = press_at(state, "g", now);

    let (state, effects) = update(
        state,
        Msg::Tick {
            at: now + Duration::from_millis(100),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().status_line(),
        "Page: 1 | Vulnerabilities: 20 | g-"
    );

    let (mut state, _) = update(
        state,
        Msg::Tick {
            at: now + Duration::from_millis(500),
        },
    );
    assert!(state.consume_dirty());
    assert_eq!(state.view().pending_key, None);
    assert_eq!(
        state.view().status_line(),
        "Page: 1 | Vulnerabilities: 20"
    );
}
