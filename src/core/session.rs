//! Interactive session state (composition root).
//!
//! Owns the focus manager, window router, and dispatcher for one interactive
//! session and drives them from raw input chunks: decode, then dispatch each
//! event strictly in arrival order. Nothing here is global; the session is
//! constructed once by `main` and threaded to whoever needs it.
//!
//! The session is also the owning pane of the root hierarchy, so it routes
//! Escape presses the dispatcher leaves unconsumed into
//! [`FocusManager::exit_one_level`], and treats an unconsumed chat-side
//! Ctrl+c as the shutdown request.

use anyhow::Result;

use crate::config::Config;
use crate::core::dispatcher::{
    ChatSubmitter, DispatchOutcome, InputDispatcher, MouseSink, TerminalCommandExecutor,
};
use crate::core::focus::FocusManager;
use crate::core::window::WindowRouter;
use crate::input::events::{InputEvent, KeyEvent, Modifiers, SpecialKey};
use crate::input::decoder;

/// Root focus scope: the default chat/input target.
pub const ROOT_SCOPE: &str = "input";
/// Navigation bar scope, one level above the root.
pub const NAV_BAR_SCOPE: &str = "nav_bar";

/// Per-session interactive state.
pub struct Session {
    /// Application configuration.
    pub config: Config,

    /// Focus scope hierarchy (exclusively owns the focus stack).
    pub focus: FocusManager,

    /// Active window + shared line buffer (exclusively owns window state).
    pub router: WindowRouter,

    /// Event state machine over the two above.
    dispatcher: InputDispatcher,

    /// Session loop flag.
    pub running: bool,

    /// Set whenever dispatch changed observable state; the rendering
    /// collaborator clears it after drawing.
    pub needs_render: bool,

    /// Last handler failure, for the status display.
    pub status_error: Option<String>,
}

impl Session {
    /// Build a session around the caller-supplied collaborator handlers.
    pub fn new(
        config: Config,
        chat: Box<dyn ChatSubmitter>,
        terminal: Box<dyn TerminalCommandExecutor>,
        mouse: Box<dyn MouseSink>,
    ) -> Result<Self> {
        let mut focus = FocusManager::new(ROOT_SCOPE);
        // Static scopes are registered up front so render-side is_focused
        // queries are guarded against typos.
        focus.register(NAV_BAR_SCOPE)?;

        Ok(Self {
            config,
            focus,
            router: WindowRouter::new(),
            dispatcher: InputDispatcher::new(chat, terminal, mouse),
            running: true,
            needs_render: true,
            status_error: None,
        })
    }

    /// Gate input processing while an async operation is in flight.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.dispatcher.set_enabled(enabled);
    }

    pub fn input_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    /// Decode one raw chunk and handle every event in arrival order.
    pub fn process_chunk(&mut self, chunk: &[u8]) {
        for event in decoder::decode(chunk) {
            self.handle_event(event);
        }
    }

    /// Run one decoded event through the dispatcher, then apply the
    /// pane-scoped routing for whatever it left unconsumed.
    pub fn handle_event(&mut self, event: InputEvent) {
        match self.dispatcher.handle(event, &mut self.router) {
            DispatchOutcome::Consumed => {
                self.needs_render = true;
            }
            DispatchOutcome::Dropped => {}
            DispatchOutcome::HandlerFailed { message } => {
                self.status_error = Some(message);
                self.needs_render = true;
            }
            DispatchOutcome::Ignored => self.handle_unconsumed(event),
        }
    }

    fn handle_unconsumed(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(KeyEvent {
                special: SpecialKey::Escape,
                ..
            }) => {
                self.focus.exit_one_level();
                self.needs_render = true;
            }
            InputEvent::Key(KeyEvent {
                ch: Some('c'),
                modifiers: Modifiers { ctrl: true, .. },
                ..
            }) => {
                // Chat-side Ctrl+c reaches here untouched by the dispatcher.
                tracing::info!("Ctrl+c while chat active, shutting down");
                self.running = false;
            }
            _ => {}
        }
    }

    /// Take the pending status error, if any, for display.
    pub fn take_status_error(&mut self) -> Option<String> {
        self.status_error.take()
    }
}
