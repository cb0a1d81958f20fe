//! Window routing: which top-level target owns the shared input line.
//!
//! The chat pane and the embedded terminal pane share one physical input
//! line. The router tracks which of the two is active, owns the line buffer
//! (append / remove-last only), and tags finished lines with the target that
//! should receive them.

/// The two mutually exclusive top-level input targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveWindow {
    Chat,
    Terminal,
}

/// Where a finished line should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTarget {
    /// Forward to the chat-submission collaborator.
    Chat,
    /// Forward to the command-execution collaborator.
    Terminal,
}

/// A finished, accepted input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub line: String,
}

/// Callback fired with the newly active window after every toggle.
pub type WindowObserver = Box<dyn Fn(ActiveWindow)>;

/// Owns the active-window state and the shared line buffer.
pub struct WindowRouter {
    active: ActiveWindow,
    line_buffer: String,
    observer: Option<WindowObserver>,
}

impl WindowRouter {
    pub fn new() -> Self {
        Self {
            active: ActiveWindow::Chat,
            line_buffer: String::new(),
            observer: None,
        }
    }

    /// Subscribe to active-window changes.
    pub fn set_observer(&mut self, observer: WindowObserver) {
        self.observer = Some(observer);
    }

    /// Toggle between chat and terminal. Unconditional two-state cycle:
    /// calling twice restores the original state.
    pub fn switch_window(&mut self) {
        self.active = match self.active {
            ActiveWindow::Chat => ActiveWindow::Terminal,
            ActiveWindow::Terminal => ActiveWindow::Chat,
        };
        tracing::debug!(window = ?self.active, "switched active window");
        if let Some(ref observer) = self.observer {
            observer(self.active);
        }
    }

    pub fn is_chat_active(&self) -> bool {
        self.active == ActiveWindow::Chat
    }

    pub fn is_terminal_active(&self) -> bool {
        self.active == ActiveWindow::Terminal
    }

    /// Append one character to the line buffer.
    pub fn append_char(&mut self, ch: char) {
        self.line_buffer.push(ch);
    }

    /// Remove the last character. No-op on an empty buffer.
    pub fn backspace(&mut self) {
        self.line_buffer.pop();
    }

    /// Current buffer contents, for rendering the input line.
    pub fn line(&self) -> &str {
        &self.line_buffer
    }

    /// Finish the current line.
    ///
    /// Empty or whitespace-only buffers yield `None` and leave the buffer
    /// untouched. An accepted line is returned trimmed, tagged with the
    /// active window's target, and the buffer is cleared exactly once.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.line_buffer.trim().is_empty() {
            return None;
        }

        let line = std::mem::take(&mut self.line_buffer);
        let target = match self.active {
            ActiveWindow::Chat => SubmitTarget::Chat,
            ActiveWindow::Terminal => SubmitTarget::Terminal,
        };
        Some(Submission {
            target,
            line: line.trim().to_string(),
        })
    }
}

impl Default for WindowRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_active_by_default() {
        let router = WindowRouter::new();
        assert!(router.is_chat_active());
        assert!(!router.is_terminal_active());
    }

    #[test]
    fn test_switch_is_self_inverse() {
        let mut router = WindowRouter::new();
        let before = (router.is_chat_active(), router.is_terminal_active());

        router.switch_window();
        assert!(router.is_terminal_active());

        router.switch_window();
        assert_eq!(
            before,
            (router.is_chat_active(), router.is_terminal_active())
        );
    }

    #[test]
    fn test_append_and_backspace() {
        let mut router = WindowRouter::new();
        router.append_char('h');
        router.append_char('i');
        assert_eq!(router.line(), "hi");

        router.backspace();
        assert_eq!(router.line(), "h");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut router = WindowRouter::new();
        router.backspace();
        router.backspace();
        assert_eq!(router.line(), "");
    }

    #[test]
    fn test_submit_routes_to_active_window() {
        let mut router = WindowRouter::new();
        router.append_char('h');
        router.append_char('i');

        let sub = router.submit().expect("non-empty line submits");
        assert_eq!(sub.target, SubmitTarget::Chat);
        assert_eq!(sub.line, "hi");
        assert_eq!(router.line(), "");

        router.switch_window();
        router.append_char('l');
        router.append_char('s');
        let sub = router.submit().expect("non-empty line submits");
        assert_eq!(sub.target, SubmitTarget::Terminal);
        assert_eq!(sub.line, "ls");
    }

    #[test]
    fn test_submit_empty_is_noop() {
        let mut router = WindowRouter::new();
        assert!(router.submit().is_none());

        router.append_char(' ');
        router.append_char('\u{3000}');
        assert!(router.submit().is_none());
        // Whitespace-only buffer is left untouched.
        assert_eq!(router.line().chars().count(), 2);
    }

    #[test]
    fn test_submit_trims_line() {
        let mut router = WindowRouter::new();
        for ch in "  hello  ".chars() {
            router.append_char(ch);
        }
        let sub = router.submit().unwrap();
        assert_eq!(sub.line, "hello");
    }

    #[test]
    fn test_observer_fires_on_toggle() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<ActiveWindow>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut router = WindowRouter::new();
        router.set_observer(Box::new(move |w| seen_clone.borrow_mut().push(w)));

        router.switch_window();
        router.switch_window();
        assert_eq!(
            *seen.borrow(),
            vec![ActiveWindow::Terminal, ActiveWindow::Chat]
        );
    }
}
