//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   terminal input from a blocking reader, fetch results from spawned fetches.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Every `ListController` transition happens here, on the loop.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use folio_proto::client::{FetchError, ListClient};
use folio_proto::config::{Config, ListingConfig, ResponseOrdering};
use folio_proto::listing::{LoadOutcome, LoadTicket};
use folio_proto::protocol::{Book, Listing, ListingKind, Quote};

use crate::{
    action::{Action, ComponentId, Workspace},
    app_state::AppState,
    component::Component,
    components::{header::Header, help_overlay::HelpOverlay, listing_pane::ListingPane},
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
    workspace::WorkspaceManager,
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    BooksLoaded(LoadTicket, Result<Vec<Book>, FetchError>),
    QuotesLoaded(LoadTicket, Result<Vec<Quote>, FetchError>),
}

pub struct App {
    state: AppState,
    wm: WorkspaceManager,
    client: ListClient,
    ordering: ResponseOrdering,

    header: Header,
    book_grid: ListingPane<Book>,
    quote_grid: ListingPane<Quote>,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    /// Latest fetch task per listing.
    in_flight: HashMap<ListingKind, JoinHandle<()>>,
    /// Last-drawn area per component, for mouse hit-testing.
    pane_areas: HashMap<ComponentId, Rect>,
    tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, client: ListClient) -> Self {
        Self {
            state: AppState::new(config),
            wm: WorkspaceManager::new(),
            client,
            ordering: config.fetch.ordering,
            header: Header::new(),
            book_grid: ListingPane::new(),
            quote_grid: ListingPane::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            in_flight: HashMap::new(),
            pane_areas: HashMap::new(),
            tx: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        let reader_stop = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&reader_stop);
        tokio::task::spawn_blocking(move || {
            pump_terminal_events(&stop, &event_tx, |timeout| {
                if event::poll(timeout)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            })
        });

        // First workspace mounts immediately
        self.switch_workspace(self.wm.workspace);

        // Toast expiry + spinner animation
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 64;
                    self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        match rx.try_recv() {
                            Ok(next) => self.handle_message(next),
                            Err(_) => break,
                        }
                        drained += 1;
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    let expired = self.toast.tick();
                    if self.state.any_fetching() {
                        self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
                        needs_redraw = true;
                    }
                    needs_redraw |= expired;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        // The reader notices within one poll interval, so runtime shutdown
        // doesn't wait on another keypress.
        reader_stop.store(true, Ordering::Relaxed);
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("folio exiting");

        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                }
                Event::Mouse(mouse) => {
                    for a in self.handle_mouse(mouse) {
                        self.dispatch(a);
                    }
                }
                Event::Resize(w, h) => self.dispatch(Action::Resize(w, h)),
                _ => {}
            },
            AppMessage::BooksLoaded(ticket, result) => {
                let outcome = self.state.books.complete_load(ticket, result);
                self.on_loaded(ListingKind::Books, ticket, outcome);
            }
            AppMessage::QuotesLoaded(ticket, result) => {
                let outcome = self.state.quotes.complete_load(ticket, result);
                self.on_loaded(ListingKind::Quotes, ticket, outcome);
            }
        }
    }

    fn on_loaded(&mut self, kind: ListingKind, ticket: LoadTicket, outcome: LoadOutcome) {
        debug!("[{}] fetch #{} -> {:?}", kind.path(), ticket.seq(), outcome);
        if !self.state.summary(kind).fetching {
            self.in_flight.remove(&kind);
        }
    }

    // ── Fetching ──────────────────────────────────────────────────────────────

    /// Issue a fetch for `kind` on a background task. Its result re-enters
    /// the loop as an `AppMessage`.
    fn start_load(&mut self, kind: ListingKind, refresh: bool) {
        let Some(tx) = self.tx.clone() else {
            warn!("[{}] load requested before the event loop started", kind.path());
            return;
        };
        let client = self.client.clone();
        let handle = match kind {
            ListingKind::Books => {
                let ticket = self.state.books.begin_load(refresh);
                let cfg = self.state.books.config().clone();
                spawn_fetch(client, cfg, ticket, tx, AppMessage::BooksLoaded)
            }
            ListingKind::Quotes => {
                let ticket = self.state.quotes.begin_load(refresh);
                let cfg = self.state.quotes.config().clone();
                spawn_fetch(client, cfg, ticket, tx, AppMessage::QuotesLoaded)
            }
        };

        if let Some(prev) = self.in_flight.insert(kind, handle) {
            // A superseded response would be dropped anyway
            if self.ordering == ResponseOrdering::LatestIssued && !prev.is_finished() {
                debug!("[{}] aborting superseded fetch", kind.path());
                prev.abort();
            }
        }
    }

    fn switch_workspace(&mut self, ws: Workspace) {
        let first_show = self.wm.set_workspace(ws);
        self.state.workspace = ws;
        self.state.input_mode = InputMode::Normal;
        if first_show {
            info!("[{}] first show, loading", ws.listing().path());
            self.start_load(ws.listing(), false);
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let normal = self.state.input_mode == InputMode::Normal;

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE && normal => {
                if !self.wm.show_help {
                    return vec![Action::Quit];
                }
            }
            KeyCode::Char('?') if normal => return vec![Action::ToggleHelp],
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.wm.show_help {
            return self.help_overlay.handle_key(key, &self.state);
        }

        // Tab always switches workspace; it closes the search bar first
        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            if self.state.input_mode == InputMode::Search {
                return vec![Action::CloseSearch, Action::NextWorkspace];
            }
            return vec![Action::NextWorkspace];
        }

        if normal {
            match key.code {
                KeyCode::Char('1') => return vec![Action::SwitchWorkspace(Workspace::Books)],
                KeyCode::Char('2') => return vec![Action::SwitchWorkspace(Workspace::Quotes)],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                _ => {}
            }
        }

        let s = &self.state;
        match s.workspace {
            Workspace::Books => self.book_grid.handle_key(key, s),
            Workspace::Quotes => self.quote_grid.handle_key(key, s),
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let relevant = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !relevant || self.wm.show_help {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
        }

        let id = match self.state.workspace {
            Workspace::Books => ComponentId::BookGrid,
            Workspace::Quotes => ComponentId::QuoteGrid,
        };
        let Some(&area) = self.pane_areas.get(&id) else {
            return vec![];
        };
        if !hit(area, event.column, event.row) {
            return vec![];
        }
        let s = &self.state;
        match s.workspace {
            Workspace::Books => self.book_grid.handle_mouse(event, area, s),
            Workspace::Quotes => self.quote_grid.handle_mouse(event, area, s),
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        // Broadcast to components first so they can react before state changes
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&action, s));
            out.extend(self.book_grid.on_action(&action, s));
            out.extend(self.quote_grid.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Secondary actions are applied one level deep
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match &action {
            Action::Noop | Action::Resize(_, _) => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            Action::Refresh(kind) => self.start_load(kind, true),

            Action::OpenSearch => {
                self.state.input_mode = InputMode::Search;
            }
            Action::CloseSearch => {
                self.state.input_mode = InputMode::Normal;
            }
            Action::QueryChanged(kind, text) => self.state.set_query(kind, text),

            Action::SwitchWorkspace(ws) => self.switch_workspace(ws),
            Action::NextWorkspace => self.switch_workspace(self.wm.workspace.next()),

            Action::ToggleHelp => self.wm.toggle_help(),
            Action::ToggleKeys => self.wm.toggle_keys_bar(),

            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }
            Action::Notify(msg) => self.toast.warning(msg),

            Action::Quit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) | Action::Noop => {}
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | separator | body | (keys bar) ──────────────
        let status_h = if self.wm.show_keys_bar { 1u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(status_h),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);
        status_bar::draw_separator(frame, outer[1]);

        let body = outer[2];
        let focused = !self.wm.show_help;
        let s = &self.state;
        let id = match s.workspace {
            Workspace::Books => {
                self.book_grid.draw(frame, body, focused, s);
                self.book_grid.id()
            }
            Workspace::Quotes => {
                self.quote_grid.draw(frame, body, focused, s);
                self.quote_grid.id()
            }
        };
        self.pane_areas.insert(id, body);

        if self.wm.show_keys_bar {
            status_bar::draw_keys_bar(frame, outer[3], s.input_mode, s.workspace);
        }

        if self.wm.show_help {
            self.help_overlay.draw(frame, area, false, s);
        }

        self.toast.draw(frame, area);
    }
}

/// How long the terminal reader blocks before rechecking its stop flag.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Forward terminal events into the loop until `stop` is set, the loop is
/// gone, or the terminal errors. `next` waits up to the given timeout.
fn pump_terminal_events(
    stop: &AtomicBool,
    tx: &mpsc::Sender<AppMessage>,
    mut next: impl FnMut(Duration) -> io::Result<Option<Event>>,
) {
    while !stop.load(Ordering::Relaxed) {
        match next(INPUT_POLL) {
            Ok(Some(ev)) => {
                if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("terminal input error: {}", e);
                break;
            }
        }
    }
    debug!("terminal reader stopped");
}

fn spawn_fetch<T: Listing>(
    client: ListClient,
    cfg: ListingConfig,
    ticket: LoadTicket,
    tx: mpsc::Sender<AppMessage>,
    wrap: fn(LoadTicket, Result<Vec<T>, FetchError>) -> AppMessage,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = client.fetch_batch::<T>(&cfg).await;
        if tx.send(wrap(ticket, result)).await.is_err() {
            debug!("[{}] event loop gone, dropping fetch result", T::KIND.path());
        }
    })
}
