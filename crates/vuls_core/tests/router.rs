use std::time::{Duration, Instant};

use vuls_core::{Action, KeyEventRouter, KeyToken, Keymap, Resolution, DEFAULT_SEQUENCE_TIMEOUT};

fn key(raw: &str) -> KeyToken {
    KeyToken::parse(raw).expect("valid key")
}

fn feed(router: &mut KeyEventRouter, inputs: &[(&str, u64)]) -> Vec<Action> {
    let start = Instant::now();
    inputs
        .iter()
        .filter_map(|(raw, at_ms)| {
            match router.handle(&key(raw), start + Duration::from_millis(*at_ms)) {
                Resolution::Action(action) => Some(action),
                Resolution::Pending | Resolution::Unbound => None,
            }
        })
        .collect()
}

#[test]
fn double_g_within_window_emits_first_page_once() {
    let mut router = KeyEventRouter::default();
    let actions = feed(&mut router, &[("g", 0), ("g", 400)]);
    assert_eq!(actions, vec![Action::FirstPage]);
    assert_eq!(router.pending_prefix(), None);
}

#[test]
fn prefix_followed_by_other_key_falls_through() {
    let mut router = KeyEventRouter::default();
    let actions = feed(&mut router, &[("g", 0), ("j", 100)]);
    assert_eq!(actions, vec![Action::MoveDown]);
}

#[test]
fn expired_prefix_does_not_complete_sequence() {
    let mut router = KeyEventRouter::default();
    let actions = feed(&mut router, &[("g", 0), ("g", 600)]);
    assert!(actions.is_empty());
    // The second press started a new pending prefix of its own.
    assert_eq!(router.pending_prefix(), Some(&key("g")));
}

#[test]
fn window_boundary_is_exclusive() {
    let mut router = KeyEventRouter::default();
    let actions = feed(&mut router, &[("g", 0), ("g", 500)]);
    assert!(actions.is_empty());
}

#[test]
fn first_prefix_press_is_consumed() {
    let mut router = KeyEventRouter::default();
    assert_eq!(router.handle(&key("g"), Instant::now()), Resolution::Pending);
}

#[test]
fn unbound_key_leaves_router_idle() {
    let mut router = KeyEventRouter::default();
    assert_eq!(router.handle(&key("z"), Instant::now()), Resolution::Unbound);
    assert_eq!(router.pending_prefix(), None);
}

#[test]
fn mismatched_key_clears_prefix_even_if_unbound() {
    let mut router = KeyEventRouter::default();
    let actions = feed(&mut router, &[("g", 0), ("z", 50), ("g", 100)]);
    assert!(actions.is_empty());
    assert_eq!(router.pending_prefix(), Some(&key("g")));
}

#[test]
fn equivalent_keys_resolve_to_same_action() {
    let mut router = KeyEventRouter::default();
    let actions = feed(
        &mut router,
        &[("ctrl+f", 0), ("pagedown", 10), ("d", 20), ("G", 30)],
    );
    assert_eq!(
        actions,
        vec![
            Action::NextPage,
            Action::NextPage,
            Action::NextPage,
            Action::LastPage
        ]
    );
}

#[test]
fn prefix_and_timeout_come_from_configuration() {
    let mut bindings = vuls_core::ModeBindings::new();
    bindings.insert(Action::FirstPage, vec!["z,z".to_string()]);
    bindings.insert(Action::MoveDown, vec!["j".to_string()]);
    let keymap = Keymap::from_bindings("custom", &bindings).unwrap();
    let mut router = KeyEventRouter::new(keymap, Duration::from_millis(1_000));

    let actions = feed(&mut router, &[("z", 0), ("z", 900), ("g", 950), ("g", 960)]);
    assert_eq!(actions, vec![Action::FirstPage]);
    assert_eq!(router.timeout(), Duration::from_millis(1_000));
    assert_ne!(router.timeout(), DEFAULT_SEQUENCE_TIMEOUT);
}

#[test]
fn reset_drops_pending_prefix() {
    let mut router = KeyEventRouter::default();
    let now = Instant::now();
    router.handle(&key("g"), now);
    router.reset();
    assert_eq!(router.handle(&key("g"), now), Resolution::Pending);
}

#[test]
fn expire_clears_prefix_only_after_window() {
    let mut router = KeyEventRouter::default();
    let start = Instant::now();
    router.handle(&key("g"), start);

    assert!(!router.expire(start + Duration::from_millis(499)));
    assert_eq!(router.pending_prefix(), Some(&key("g")));

    assert!(router.expire(start + Duration::from_millis(500)));
    assert_eq!(router.pending_prefix(), None);
    assert!(!router.expire(start + Duration::from_millis(900)));

    // A press after expiry starts over instead of completing `g g`.
    assert_eq!(
        router.handle(&key("g"), start + Duration::from_millis(510)),
        Resolution::Pending
    );
}
