//! TUI Application state and main loop
//!
//! [`AppState`] holds everything the screen shows and reacts to events
//! without touching the terminal, so it can be driven from tests.
//! [`TuiApp`] owns the terminal and runs the loop.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;

use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::composer::{Composer, ComposerAction};
use super::events::{Event, EventHandler};
use super::widgets::{
    InputWidgetRenderer, MentionPopupWidget, MessageListState, MessageListWidget, PopupLayout,
    StatusBar,
};
use crate::agents::DirectorySource;
use crate::client::ChatBackend;
use crate::config::{Config, UiConfig};
use crate::dispatcher::{spawn_agent_load, AppEvent, ChatDispatcher, ReplyTexts};
use crate::session::Session;
use crate::transcript::Transcript;

/// Lines moved per PageUp/PageDown
const PAGE_SCROLL: usize = 10;
/// Lines moved per mouse wheel notch
const WHEEL_SCROLL: usize = 3;

const HINTS_IDLE: &str = "Enter send · @ mention · PgUp/PgDn scroll · Ctrl+C quit";
const HINTS_POPUP: &str = "↑↓ choose · Enter/Tab insert · Esc close";

/// Application state for the TUI
pub struct AppState {
    /// Whether the application should exit
    pub should_quit: bool,
    /// Text input and mention popup
    pub composer: Composer,
    /// Chat log
    pub transcript: Transcript,
    /// Message list scroll position
    pub message_list: MessageListState,
    /// Where the agent list came from; `None` until it loads
    pub agent_source: Option<DirectorySource>,
    /// Popup placement from the last render, for mouse clicks
    pub popup_layout: Option<PopupLayout>,
    pub config: UiConfig,
    dispatcher: ChatDispatcher,
}

impl AppState {
    pub fn new(dispatcher: ChatDispatcher, config: UiConfig) -> Self {
        Self {
            should_quit: false,
            composer: Composer::new(),
            transcript: Transcript::new(),
            message_list: MessageListState::default(),
            agent_source: None,
            popup_layout: None,
            config,
            dispatcher,
        }
    }

    pub fn session(&self) -> &Session {
        self.dispatcher.session()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Send a message as if it was typed and submitted
    pub fn submit(&mut self, text: &str) {
        self.dispatcher.send(&mut self.transcript, text);
        self.message_list.scroll_to_bottom();
    }

    /// Handle a terminal event
    ///
    /// Returns true if the screen needs a redraw.
    pub fn handle_event(&mut self, event: Event) -> bool {
        if event.is_quit() {
            self.quit();
            return true;
        }

        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Paste(text) => {
                let action = self.composer.handle_paste(&text);
                self.apply_composer_action(action)
            }
            Event::Resize(_, _) => true,
            Event::Tick => false,
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        let action = self.composer.handle_key(key);
        if action != ComposerAction::Ignored {
            return self.apply_composer_action(action);
        }

        match key.code {
            KeyCode::PageUp => self.message_list.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.message_list.scroll_down(PAGE_SCROLL),
            KeyCode::Up => self.message_list.scroll_up(1),
            KeyCode::Down => self.message_list.scroll_down(1),
            _ => return false,
        }
        true
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.composer.popup().is_visible() {
                    return false;
                }
                let item_count = self.composer.popup().items().len();
                let hit = self
                    .popup_layout
                    .and_then(|layout| layout.index_at(mouse.column, mouse.row, item_count));
                match hit {
                    Some(index) => {
                        let action = self.composer.click_item(index);
                        self.apply_composer_action(action)
                    }
                    None => false,
                }
            }
            MouseEventKind::ScrollUp => {
                self.message_list.scroll_up(WHEEL_SCROLL);
                true
            }
            MouseEventKind::ScrollDown => {
                self.message_list.scroll_down(WHEEL_SCROLL);
                true
            }
            _ => false,
        }
    }

    fn apply_composer_action(&mut self, action: ComposerAction) -> bool {
        match action {
            ComposerAction::Ignored => false,
            ComposerAction::Handled => true,
            ComposerAction::Submit(text) => {
                self.submit(&text);
                true
            }
        }
    }

    /// Apply a result delivered by a background task
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AgentsLoaded { agents, source } => {
                tracing::debug!("Agent directory ready: {} agents ({:?})", agents.len(), source);
                self.composer.set_agents(agents);
                self.agent_source = Some(source);
            }
            AppEvent::ReplyReady { id, text } => {
                if let Err(e) = self.transcript.resolve(&id, text) {
                    tracing::warn!("Dropping reply: {}", e);
                }
            }
        }
    }

    /// Draw the whole screen
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        if self.transcript.take_scroll_request() {
            self.message_list.scroll_to_bottom();
        }
        frame.render_stateful_widget(
            MessageListWidget::new(&self.transcript).show_timestamps(self.config.show_timestamps),
            chunks[0],
            &mut self.message_list,
        );

        let input_area = chunks[1];
        let input_block = Block::default()
            .title(" Message ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(
            InputWidgetRenderer::new(self.composer.input()).block(input_block),
            input_area,
        );

        let hints = if self.composer.popup().is_visible() {
            HINTS_POPUP
        } else {
            HINTS_IDLE
        };
        frame.render_widget(
            StatusBar::new(self.session().id())
                .agents(self.composer.popup().items().len(), self.agent_source)
                .pending_replies(self.transcript.pending_count())
                .keybind_hints(hints),
            chunks[2],
        );

        self.popup_layout = None;
        if self.composer.popup().is_visible() {
            let inner_width = input_area.width.saturating_sub(2);
            let column = (self.composer.input().cursor_column() as u16)
                .min(inner_width.saturating_sub(1));
            let anchor = (input_area.x + 1 + column, input_area.y);
            let popup = MentionPopupWidget::new(self.composer.popup(), anchor);
            self.popup_layout = Some(popup.layout(frame.area()));
            frame.render_widget(popup, frame.area());
        }
    }
}

/// Terminal application
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    events: EventHandler,
    state: AppState,
    app_event_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl TuiApp {
    /// Set up the terminal and start loading the agent directory
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        session: Session,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        spawn_agent_load(Arc::clone(&backend), tx.clone());

        let texts = ReplyTexts {
            pending: config.ui.pending_text.clone(),
            no_response: config.ui.no_response_text.clone(),
        };
        let dispatcher = ChatDispatcher::new(backend, session, texts, tx);
        let state = AppState::new(dispatcher, config.ui.clone());

        Self::install_panic_hook();
        let terminal = Self::setup_terminal()?;

        Ok(Self {
            terminal,
            events: EventHandler::with_tick_rate(std::time::Duration::from_millis(
                config.ui.tick_rate_ms.max(10),
            )),
            state,
            app_event_rx: rx,
        })
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Install a panic hook that restores the terminal before panicking
    fn install_panic_hook() {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::restore_terminal_static();
            original_hook(panic_info);
        }));
    }

    /// Static version of restore_terminal for use in panic hook
    fn restore_terminal_static() -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        Ok(())
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Apply all results that arrived since the last call
    ///
    /// Returns true if any were processed.
    fn poll_app_events(&mut self) -> bool {
        let mut processed = false;
        while let Ok(event) = self.app_event_rx.try_recv() {
            self.state.handle_app_event(event);
            processed = true;
        }
        processed
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let state = &mut self.state;
        self.terminal.draw(|frame| state.render(frame))?;
        Ok(())
    }

    /// Run the main event loop until the user quits
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.render()?;

        while !self.state.should_quit {
            let app_events_processed = self.poll_app_events();

            let event = self.events.poll()?;
            let needs_redraw = self.state.handle_event(event);

            if needs_redraw || app_events_processed {
                self.render()?;
            }

            // let spawned requests make progress on this worker too
            tokio::task::yield_now().await;
        }

        Ok(())
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
