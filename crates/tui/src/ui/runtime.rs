//! Runtime: unified event loop and input routing for the reader.
//!
//! Responsibilities
//! - Own the terminal lifecycle (enter/leave alternate screen, raw mode).
//! - Drive a single event loop that handles input, ticks, and book changes.
//! - Route events to the main view and execute the returned `Effect`s.
//! - Watch the book directory so regenerated books reload in place.
//!
//! Event Loop Strategy
//! - Dedicated input task owns `poll()`/`read()` and forwards events over a
//!   channel, keeping blocking terminal reads off the async loop.
//! - Smart ticking: fast interval (100 ms) only while effects are queued;
//!   long interval (5 s) when idle. Queued effects are executed on the tick
//!   arm, and the fast interval's immediate first tick keeps latency low.
//! - Filesystem notifications collapse into `Msg::BookChanged`, and a burst
//!   of them folds into a single reload.
//!
//! Entry Point
//! - `run_app(book, session, initial_page)` is called from `lib::run` and
//!   performs setup, event processing, and teardown.
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::MouseEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::{Terminal, prelude::*};
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tome_engine::Book;
use tome_types::{Effect, Msg};
use tome_util::SessionStore;
use tracing::{debug, warn};

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;
use crate::ui::theme;
use rat_focus::FocusBuilder;

/// Spawn a dedicated input task that blocks on terminal input and forwards
/// `crossterm` events over a Tokio channel.
///
/// Keeping `poll()` and `read()` on the same task avoids lost or delayed
/// events in some terminals, and isolates the blocking reads from the event
/// loop.
async fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    let mut last_mouse_event: Option<Instant> = Some(Instant::now());

    tokio::spawn(async move {
        let sixteen_ms = Duration::from_millis(16);
        loop {
            if matches!(event::poll(sixteen_ms), Ok(true)) {
                match event::read() {
                    Ok(event) => {
                        // Throttle mouse move events to once per 16 ms.
                        let is_mouse_move = event.as_mouse_event().is_some_and(|e| e.kind == MouseEventKind::Moved);
                        let should_send = !is_mouse_move || last_mouse_event.is_some_and(|last| last.elapsed() >= sixteen_ms);
                        if is_mouse_move && should_send {
                            last_mouse_event = Some(Instant::now());
                        }

                        if should_send && let Err(e) = sender.send(event).await {
                            tracing::warn!("Failed to send event: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read event: {}", e);
                        break;
                    }
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
///
/// Returns a ratatui `Terminal` backed by Crossterm for later drawing.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Renders a frame by delegating to the main view.
fn render(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    // Rebuild focus just before rendering so structure changes are reflected
    let old_focus = Rc::unwrap_or_clone(Rc::clone(&app.focus));
    app.focus = Rc::new(FocusBuilder::rebuild_for(app, Some(old_focus)));
    if app.focus.focused().is_none() {
        main_view.restore_focus(app);
    }
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

/// Handle raw crossterm input events and update `App`/components.
fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),

        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Watches the book directory and forwards change notifications. Returns
/// `None` when the watcher cannot be set up, which only disables live
/// reload.
fn spawn_book_watcher(root: &Path) -> Option<(RecommendedWatcher, mpsc::Receiver<()>)> {
    let (sender, receiver) = mpsc::channel(16);
    let mut watcher = match notify::recommended_watcher(move |result: Result<notify::Event, notify::Error>| {
        if let Ok(event) = result
            && matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
        {
            let _ = sender.blocking_send(());
        }
    }) {
        Ok(watcher) => watcher,
        Err(error) => {
            warn!("Book watcher unavailable: {error}");
            return None;
        }
    };
    if let Err(error) = watcher.watch(root, RecursiveMode::Recursive) {
        warn!("Failed to watch {}: {error}", root.display());
        return None;
    }
    debug!("watching {} for changes", root.display());
    Some((watcher, receiver))
}

/// Executes a batch of effects against the application. Returns `true` when
/// the batch requested shutdown.
fn process_effects(app: &mut App, effects: Vec<Effect>) -> bool {
    let mut should_quit = false;
    let mut reloaded = false;
    for effect in effects {
        match effect {
            Effect::FollowLink(href) => app.follow_link(&href),
            Effect::OpenPrevious => app.open_neighbor(false),
            Effect::OpenNext => app.open_neighbor(true),
            Effect::ReloadBook => {
                // A change burst queues several reloads; one is enough.
                if !reloaded {
                    reloaded = true;
                    if let Err(error) = app.reload_book() {
                        warn!("Failed to reload book: {error}");
                    }
                }
            }
            Effect::Quit => should_quit = true,
        }
    }
    should_quit
}

/// Entry point for the TUI runtime: opens the initial page, sets up the
/// terminal, spawns the event producers, runs the async event loop, and
/// performs cleanup on exit.
pub async fn run_app(book: Book, session: Arc<dyn SessionStore>, initial_page: Option<String>) -> Result<()> {
    let initial = match initial_page {
        Some(page) => page,
        None => book.first_chapter().map(str::to_string).context("book has no readable chapters")?,
    };

    // Input comes from a dedicated task to ensure reliability.
    let mut input_receiver = spawn_input_thread().await;
    let mut main_view = MainView::new();

    let mut app =
        App::new(book, theme::load(), session, &initial).with_context(|| format!("failed to open page {initial:?}"))?;

    // Dropping the watcher stops notifications; it stays bound for the whole
    // loop.
    let (_watcher, mut book_events) = match spawn_book_watcher(app.ctx.book.root()) {
        Some((watcher, receiver)) => (Some(watcher), Some(receiver)),
        None => (None, None),
    };

    let mut terminal = setup_terminal()?;

    let mut effects: Vec<Effect> = Vec::with_capacity(5);
    let mut should_quit = false;

    // Ticking strategy: fast while effects are queued, very slow when idle.
    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    // Track the last known terminal size to synthesize Resize messages when
    // some terminals fail to emit them reliably.
    let mut last_size: Option<(u16, u16)> = crossterm::terminal::size().ok();

    loop {
        // Queued effects need the fast ticker; adjust it dynamically.
        let needs_tick = !effects.is_empty();
        let target_interval = if needs_tick { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        let mut needs_render = false;
        tokio::select! {
            // Terminal input events
            maybe_event = input_receiver.recv() => {
                if let Some(event) = maybe_event {
                    if let Event::Key(key_event) = event
                        && key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
                            break;
                        }
                    effects.extend(handle_input_event(&mut app, &mut main_view, event));
                } else {
                    // Input channel closed; break out to shut down cleanly.
                    break;
                }
                needs_render = true;
            }

            // Periodic tick; queued effects are executed here
            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(&mut app, Msg::Tick));
                if !effects.is_empty() {
                    let batch = std::mem::take(&mut effects);
                    should_quit = process_effects(&mut app, batch);
                    needs_render = true;
                }
            }

            // The book directory changed on disk
            maybe_change = async {
                match book_events.as_mut() {
                    Some(receiver) => receiver.recv().await,
                    None => None,
                }
            }, if book_events.is_some() => {
                match maybe_change {
                    Some(()) => {
                        // Generators rewrite many files at once; drain the
                        // burst before queueing the reload.
                        if let Some(receiver) = book_events.as_mut() {
                            while receiver.try_recv().is_ok() {}
                        }
                        effects.extend(main_view.handle_message(&mut app, Msg::BookChanged));
                        needs_render = true;
                    }
                    None => {
                        book_events = None;
                    }
                }
            }

            // Handle Ctrl+C
            _ = signal::ctrl_c() => { break; }
        }

        if should_quit {
            break;
        }

        // Fallback: detect terminal size changes even if no explicit Resize
        // event was received. This handles terminals that miss SIGWINCH or
        // drop resize notifications during interactive operations.
        if let Ok((w, h)) = crossterm::terminal::size()
            && last_size != Some((w, h))
        {
            last_size = Some((w, h));
            let _ = app.update(&Msg::Resize(w, h));
            needs_render = true;
        }

        // Render if dirty
        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    cleanup_terminal(&mut terminal)?;
    Ok(())
}
