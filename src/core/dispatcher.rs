//! Event dispatch: the state machine between decoded events and handlers.
//!
//! The dispatcher is the single entry point for every decoded event. It
//! consults the window router to decide between text editing, window
//! switching, and submission, and hands finished lines / signals to the
//! capability handlers supplied at construction. A global `enabled` gate
//! drops everything while an async operation elsewhere owns the input.
//!
//! Handler failures never escape `handle`: they are converted into a
//! [`DispatchOutcome::HandlerFailed`] carrying a message, so one failing
//! submission cannot stall input processing.

use anyhow::Result;

use crate::core::window::{SubmitTarget, WindowRouter};
use crate::input::events::{InputEvent, KeyEvent, MouseEvent, SpecialKey};

/// Receives accepted chat lines.
pub trait ChatSubmitter {
    fn submit_chat(&mut self, line: &str) -> Result<()>;
}

/// The embedded-terminal collaborator: runs commands and takes
/// interrupt/clear signals.
pub trait TerminalCommandExecutor {
    fn run_command(&mut self, line: &str) -> Result<()>;
    fn interrupt(&mut self);
    fn clear(&mut self);
}

/// Receives mouse events unchanged for hit-testing against rendered regions.
pub trait MouseSink {
    fn handle_mouse(&mut self, event: MouseEvent);
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event changed state or reached a handler.
    Consumed,
    /// The event is not for this dispatcher (escape, chat-side Ctrl+c,
    /// unknown keys); the owning layer may still observe it.
    Ignored,
    /// Input is gated off; the event was dropped without side effects.
    Dropped,
    /// A handler failed; the message is surfaced via the status display,
    /// never thrown.
    HandlerFailed { message: String },
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::HandlerFailed { .. })
    }
}

/// Routes decoded events to the window router and capability handlers.
pub struct InputDispatcher {
    enabled: bool,
    chat: Box<dyn ChatSubmitter>,
    terminal: Box<dyn TerminalCommandExecutor>,
    mouse: Box<dyn MouseSink>,
}

impl InputDispatcher {
    pub fn new(
        chat: Box<dyn ChatSubmitter>,
        terminal: Box<dyn TerminalCommandExecutor>,
        mouse: Box<dyn MouseSink>,
    ) -> Self {
        Self {
            enabled: true,
            chat,
            terminal,
            mouse,
        }
    }

    /// Gate the dispatcher. While disabled every `handle` call is a pure
    /// no-op; dropped events are not queued.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle one event against the current window state.
    pub fn handle(&mut self, event: InputEvent, router: &mut WindowRouter) -> DispatchOutcome {
        if !self.enabled {
            return DispatchOutcome::Dropped;
        }

        match event {
            InputEvent::Mouse(mouse) => {
                // Hit-testing lives with the rendering layer; forward as-is.
                self.mouse.handle_mouse(mouse);
                DispatchOutcome::Consumed
            }
            InputEvent::Key(key) => self.handle_key(key, router),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, router: &mut WindowRouter) -> DispatchOutcome {
        match key.special {
            // Arrow keys are reserved for window switching; they never move
            // a text cursor.
            SpecialKey::ArrowLeft | SpecialKey::ArrowRight => {
                router.switch_window();
                return DispatchOutcome::Consumed;
            }
            SpecialKey::Return => return self.submit(router),
            SpecialKey::Backspace | SpecialKey::Delete => {
                router.backspace();
                return DispatchOutcome::Consumed;
            }
            // Escape routing is pane-scoped; the owning pane forwards it to
            // FocusManager::exit_one_level.
            SpecialKey::Escape => return DispatchOutcome::Ignored,
            SpecialKey::ArrowUp | SpecialKey::ArrowDown => return DispatchOutcome::Ignored,
            SpecialKey::None => {}
        }

        let Some(ch) = key.ch else {
            return DispatchOutcome::Ignored;
        };

        if key.modifiers.ctrl {
            return match ch {
                // Interrupt semantics are window-scoped: chat-side Ctrl+c is
                // left for the shutdown handler to observe.
                'c' if router.is_terminal_active() => {
                    self.terminal.interrupt();
                    DispatchOutcome::Consumed
                }
                'l' if router.is_terminal_active() => {
                    self.terminal.clear();
                    DispatchOutcome::Consumed
                }
                _ => DispatchOutcome::Ignored,
            };
        }

        if key.modifiers.alt {
            return DispatchOutcome::Ignored;
        }

        router.append_char(ch);
        DispatchOutcome::Consumed
    }

    fn submit(&mut self, router: &mut WindowRouter) -> DispatchOutcome {
        let Some(submission) = router.submit() else {
            return DispatchOutcome::Consumed;
        };

        let result = match submission.target {
            SubmitTarget::Chat => self.chat.submit_chat(&submission.line),
            SubmitTarget::Terminal => self.terminal.run_command(&submission.line),
        };

        match result {
            Ok(()) => DispatchOutcome::Consumed,
            Err(e) => {
                tracing::warn!(error = %e, "submission handler failed");
                DispatchOutcome::HandlerFailed {
                    message: format!("{:#}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::{InputEvent, Modifiers, MouseAction, MouseButton};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared call log for the recording fakes below.
    #[derive(Default)]
    struct Calls {
        chat_lines: Vec<String>,
        commands: Vec<String>,
        interrupts: usize,
        clears: usize,
        mouse_events: Vec<MouseEvent>,
        fail_next: bool,
    }

    #[derive(Clone)]
    struct Recorder(Rc<RefCell<Calls>>);

    impl ChatSubmitter for Recorder {
        fn submit_chat(&mut self, line: &str) -> Result<()> {
            let mut calls = self.0.borrow_mut();
            if calls.fail_next {
                anyhow::bail!("chat backend unavailable");
            }
            calls.chat_lines.push(line.to_string());
            Ok(())
        }
    }

    impl TerminalCommandExecutor for Recorder {
        fn run_command(&mut self, line: &str) -> Result<()> {
            self.0.borrow_mut().commands.push(line.to_string());
            Ok(())
        }

        fn interrupt(&mut self) {
            self.0.borrow_mut().interrupts += 1;
        }

        fn clear(&mut self) {
            self.0.borrow_mut().clears += 1;
        }
    }

    impl MouseSink for Recorder {
        fn handle_mouse(&mut self, event: MouseEvent) {
            self.0.borrow_mut().mouse_events.push(event);
        }
    }

    fn setup() -> (InputDispatcher, WindowRouter, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let recorder = Recorder(calls.clone());
        let dispatcher = InputDispatcher::new(
            Box::new(recorder.clone()),
            Box::new(recorder.clone()),
            Box::new(recorder),
        );
        (dispatcher, WindowRouter::new(), calls)
    }

    fn type_line(dispatcher: &mut InputDispatcher, router: &mut WindowRouter, text: &str) {
        for ch in text.chars() {
            dispatcher.handle(InputEvent::character(ch, Modifiers::NONE), router);
        }
    }

    #[test]
    fn test_typing_then_return_submits_chat() {
        let (mut dispatcher, mut router, calls) = setup();

        type_line(&mut dispatcher, &mut router, "hi");
        let outcome = dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );

        assert_eq!(outcome, DispatchOutcome::Consumed);
        assert_eq!(calls.borrow().chat_lines, vec!["hi".to_string()]);
        assert_eq!(router.line(), "");
    }

    #[test]
    fn test_return_on_empty_buffer_calls_no_handler() {
        let (mut dispatcher, mut router, calls) = setup();

        dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );
        assert!(calls.borrow().chat_lines.is_empty());
        assert!(calls.borrow().commands.is_empty());
    }

    #[test]
    fn test_terminal_window_receives_commands() {
        let (mut dispatcher, mut router, calls) = setup();

        dispatcher.handle(
            InputEvent::special(SpecialKey::ArrowRight, Modifiers::NONE),
            &mut router,
        );
        assert!(router.is_terminal_active());

        type_line(&mut dispatcher, &mut router, "ls");
        dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );

        assert_eq!(calls.borrow().commands, vec!["ls".to_string()]);
        assert!(calls.borrow().chat_lines.is_empty());
    }

    #[test]
    fn test_arrows_switch_window_regardless_of_modifiers() {
        let (mut dispatcher, mut router, _calls) = setup();

        dispatcher.handle(
            InputEvent::special(
                SpecialKey::ArrowLeft,
                Modifiers {
                    shift: true,
                    alt: true,
                    ctrl: true,
                },
            ),
            &mut router,
        );
        assert!(router.is_terminal_active());

        dispatcher.handle(
            InputEvent::special(SpecialKey::ArrowRight, Modifiers::NONE),
            &mut router,
        );
        assert!(router.is_chat_active());
    }

    #[test]
    fn test_ctrl_c_is_window_scoped() {
        let (mut dispatcher, mut router, calls) = setup();
        let ctrl_c = InputEvent::character('c', Modifiers::ctrl());

        // Chat active: not consumed, left for the shutdown handler.
        let outcome = dispatcher.handle(ctrl_c, &mut router);
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(calls.borrow().interrupts, 0);

        router.switch_window();
        let outcome = dispatcher.handle(ctrl_c, &mut router);
        assert_eq!(outcome, DispatchOutcome::Consumed);
        assert_eq!(calls.borrow().interrupts, 1);
    }

    #[test]
    fn test_ctrl_l_clears_only_terminal() {
        let (mut dispatcher, mut router, calls) = setup();
        let ctrl_l = InputEvent::character('l', Modifiers::ctrl());

        dispatcher.handle(ctrl_l, &mut router);
        assert_eq!(calls.borrow().clears, 0);

        router.switch_window();
        dispatcher.handle(ctrl_l, &mut router);
        assert_eq!(calls.borrow().clears, 1);
    }

    #[test]
    fn test_ctrl_char_does_not_enter_buffer() {
        let (mut dispatcher, mut router, _calls) = setup();
        dispatcher.handle(InputEvent::character('x', Modifiers::ctrl()), &mut router);
        assert_eq!(router.line(), "");
    }

    #[test]
    fn test_backspace_and_delete_edit_buffer() {
        let (mut dispatcher, mut router, _calls) = setup();
        type_line(&mut dispatcher, &mut router, "abc");

        dispatcher.handle(
            InputEvent::special(SpecialKey::Backspace, Modifiers::NONE),
            &mut router,
        );
        dispatcher.handle(
            InputEvent::special(SpecialKey::Delete, Modifiers::NONE),
            &mut router,
        );
        assert_eq!(router.line(), "a");
    }

    #[test]
    fn test_disabled_dispatcher_drops_everything() {
        let (mut dispatcher, mut router, calls) = setup();
        dispatcher.set_enabled(false);

        type_line(&mut dispatcher, &mut router, "hi");
        let outcome = dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );
        assert_eq!(outcome, DispatchOutcome::Dropped);
        assert_eq!(router.line(), "");
        assert!(calls.borrow().chat_lines.is_empty());

        let outcome = dispatcher.handle(
            InputEvent::mouse(1, 1, MouseAction::Down, MouseButton::Left, Modifiers::NONE),
            &mut router,
        );
        assert_eq!(outcome, DispatchOutcome::Dropped);
        assert!(calls.borrow().mouse_events.is_empty());

        // Re-enable: input flows again.
        dispatcher.set_enabled(true);
        type_line(&mut dispatcher, &mut router, "ok");
        assert_eq!(router.line(), "ok");
    }

    #[test]
    fn test_mouse_forwarded_unchanged() {
        let (mut dispatcher, mut router, calls) = setup();
        let event = InputEvent::mouse(
            12,
            4,
            MouseAction::ScrollDown,
            MouseButton::None,
            Modifiers::NONE,
        );
        dispatcher.handle(event, &mut router);

        let recorded = calls.borrow().mouse_events.clone();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].x, 12);
        assert_eq!(recorded[0].action, MouseAction::ScrollDown);
    }

    #[test]
    fn test_handler_failure_is_captured() {
        let (mut dispatcher, mut router, calls) = setup();
        calls.borrow_mut().fail_next = true;

        type_line(&mut dispatcher, &mut router, "hi");
        let outcome = dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );
        assert!(outcome.is_failure());

        // The failing submission must not stall later input.
        calls.borrow_mut().fail_next = false;
        type_line(&mut dispatcher, &mut router, "again");
        let outcome = dispatcher.handle(
            InputEvent::special(SpecialKey::Return, Modifiers::NONE),
            &mut router,
        );
        assert_eq!(outcome, DispatchOutcome::Consumed);
        assert_eq!(calls.borrow().chat_lines, vec!["again".to_string()]);
    }

    #[test]
    fn test_escape_not_consumed() {
        let (mut dispatcher, mut router, _calls) = setup();
        let outcome = dispatcher.handle(
            InputEvent::special(SpecialKey::Escape, Modifiers::NONE),
            &mut router,
        );
        assert_eq!(outcome, DispatchOutcome::Ignored);
    }
}
