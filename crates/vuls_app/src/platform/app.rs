use std::io::{self, Stdout};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use vuls_core::{update, AppState, KeyEventRouter, Msg, PageNumber};
use vuls_engine::EngineHandle;
use vuls_logging::{vuls_debug, vuls_info, vuls_trace};

use super::effects::{EffectRunner, ExportTarget};
use super::ui::keys::key_token;
use super::ui::render::{render, RenderOptions};

const TICK_RATE: Duration = Duration::from_millis(120);

/// Everything the interactive loop needs besides the engine.
pub struct TuiSession {
    pub router: KeyEventRouter,
    pub start_page: PageNumber,
    pub last_page: PageNumber,
    pub export: ExportTarget,
    pub render: RenderOptions,
}

/// Takes over the terminal until the user quits. The terminal is restored
/// even when the loop fails.
pub fn run_tui(session: TuiSession, engine: EngineHandle) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = event_loop(&mut terminal, session, engine);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: TuiSession,
    engine: EngineHandle,
) -> io::Result<()> {
    let TuiSession {
        router,
        start_page,
        last_page,
        export,
        render: options,
    } = session;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, export, msg_tx.clone());
    let mut state = AppState::new(router).with_last_page(last_page);
    let _ = msg_tx.send(Msg::Started { page: start_page });
    vuls_info!("Interactive session started on page {start_page}");

    let mut last_tick = Instant::now();
    loop {
        while let Ok(msg) = msg_rx.try_recv() {
            let (next, effects) = update(state, msg);
            state = next;
            runner.enqueue(effects);
        }
        if state.should_quit() {
            vuls_info!("Quit requested");
            break;
        }

        if state.consume_dirty() {
            let view = state.view();
            let clock = Local::now().format("%H:%M:%S").to_string();
            terminal.draw(|frame| render(frame, &view, &options, &clock))?;
        }

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(token) = key_token(&key) {
                        vuls_trace!("Key {token}");
                        let _ = msg_tx.send(Msg::Key {
                            token,
                            at: Instant::now(),
                        });
                    }
                }
                Event::Resize(width, height) => {
                    vuls_debug!("Terminal resized to {width}x{height}");
                    let _ = msg_tx.send(Msg::Tick { at: Instant::now() });
                }
                _ => {}
            }
        }
        if last_tick.elapsed() >= TICK_RATE {
            let _ = msg_tx.send(Msg::Tick { at: Instant::now() });
            last_tick = Instant::now();
        }
    }

    Ok(())
}
