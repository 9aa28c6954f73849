use crate::{
    parse_page_input, Action, AppState, Effect, KeyToken, Modal, Msg, PageNumber, Resolution,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { page } => load(&mut state, page.max(1)),
        Msg::Key { token, at } => {
            if state.modal().is_some() {
                handle_modal_key(&mut state, &token)
            } else {
                match state.router_mut().handle(&token, at) {
                    Resolution::Action(action) => dispatch(&mut state, action),
                    Resolution::Pending => {
                        // Shows the pending prefix in the status bar.
                        state.mark_dirty();
                        Vec::new()
                    }
                    Resolution::Unbound => Vec::new(),
                }
            }
        }
        Msg::PageLoaded {
            request,
            page: _,
            rows,
            source,
            degraded,
            last_error,
        } => {
            // Stale results (a newer page was requested meanwhile) are dropped.
            state.finish_request(request, rows, source, degraded, last_error);
            Vec::new()
        }
        Msg::Notice(text) => {
            state.set_notice(text);
            Vec::new()
        }
        Msg::Tick { at } => {
            // Keeps the clock current and drops an expired `g-` from the status bar.
            state.router_mut().expire(at);
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}

/// Maps a resolved action to its operation on the UI state.
fn dispatch(state: &mut AppState, action: Action) -> Vec<Effect> {
    match action {
        Action::MoveDown => {
            state.move_cursor(1);
            Vec::new()
        }
        Action::MoveUp => {
            state.move_cursor(-1);
            Vec::new()
        }
        Action::NextPage => {
            let next = state.page().saturating_add(1);
            load(state, next)
        }
        Action::PrevPage => {
            let current = state.page();
            if current > 1 {
                load(state, current - 1)
            } else {
                Vec::new()
            }
        }
        Action::FirstPage => load(state, 1),
        Action::LastPage => {
            let last = state.last_page();
            load(state, last)
        }
        Action::JumpToPage => {
            state.open_modal(Modal::JumpPrompt {
                input: String::new(),
            });
            Vec::new()
        }
        Action::Refresh => {
            let page = state.page();
            let request = state.begin_request(page);
            vec![Effect::RefreshPage { request, page }]
        }
        Action::Help => {
            state.open_modal(Modal::Help);
            Vec::new()
        }
        Action::Quit => {
            state.request_quit();
            vec![Effect::Quit]
        }
        Action::OpenBrowser => match state.selected() {
            Some(row) => vec![Effect::OpenBrowser {
                url: row.url.clone(),
            }],
            None => Vec::new(),
        },
        Action::Export => {
            if state.rows().is_empty() {
                return Vec::new();
            }
            vec![Effect::ExportRows {
                page: state.page(),
                rows: state.rows().to_vec(),
            }]
        }
    }
}

fn load(state: &mut AppState, page: PageNumber) -> Vec<Effect> {
    let request = state.begin_request(page);
    vec![Effect::LoadPage { request, page }]
}

fn handle_modal_key(state: &mut AppState, token: &KeyToken) -> Vec<Effect> {
    match state.modal().cloned() {
        Some(Modal::Help) => {
            if token.is("escape") || token.is("q") {
                state.close_modal();
            }
            Vec::new()
        }
        Some(Modal::JumpPrompt { input }) => {
            if token.is("escape") {
                state.close_modal();
                return Vec::new();
            }
            if token.is("enter") {
                return match parse_page_input(&input) {
                    Ok(page) => {
                        state.close_modal();
                        load(state, page)
                    }
                    Err(_) => {
                        // Invalid input is cleared silently; the prompt stays open.
                        clear_jump_input(state);
                        Vec::new()
                    }
                };
            }
            if token.is("backspace") {
                if let Some(input) = state.jump_input_mut() {
                    input.pop();
                }
                state.mark_dirty();
                return Vec::new();
            }
            if let Some(c) = token.as_char() {
                if let Some(input) = state.jump_input_mut() {
                    input.push(c);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn clear_jump_input(state: &mut AppState) {
    if let Some(input) = state.jump_input_mut() {
        input.clear();
    }
    state.mark_dirty();
}
