//! Hierarchical focus scopes.
//!
//! Focus is a stack of named scopes: the root (default input) sits at the
//! bottom and is never removed, deeper layers (navigation bar, tab content,
//! modals) are pushed on top as the user descends. Panes query
//! [`FocusManager::is_focused`] each render pass to pick highlighted borders,
//! and route Escape through [`FocusManager::exit_one_level`], which always
//! moves exactly one level back toward the root.

use std::collections::HashMap;
use std::fmt;

/// Error returned when configuring focus scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    /// The scope id is already registered; the first registration stays
    /// authoritative.
    DuplicateScope(String),
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusError::DuplicateScope(id) => {
                write!(f, "focus scope '{}' is already registered", id)
            }
        }
    }
}

impl std::error::Error for FocusError {}

/// Callback invoked with the newly focused scope id after every stack change.
pub type FocusObserver = Box<dyn Fn(&str)>;

/// Owns the focus stack and the set of registered scope ids.
pub struct FocusManager {
    /// Registered ids mapped to their registration order. Registration exists
    /// to guard static callers against typos; pushing a scope does not
    /// require it.
    registered: HashMap<String, usize>,

    /// Bottom = root (permanent), top = currently focused scope.
    stack: Vec<String>,

    /// Render-layer subscription, set once at construction time.
    observer: Option<FocusObserver>,
}

impl FocusManager {
    /// Create a manager whose root scope is `root_id`. The root is focused
    /// initially and can never be exited.
    pub fn new(root_id: impl Into<String>) -> Self {
        let root_id = root_id.into();
        let mut registered = HashMap::new();
        registered.insert(root_id.clone(), 0);
        Self {
            registered,
            stack: vec![root_id],
            observer: None,
        }
    }

    /// Subscribe to focus changes. The callback fires with the new top scope
    /// after every push or pop.
    pub fn set_observer(&mut self, observer: FocusObserver) {
        self.observer = Some(observer);
    }

    /// Register a scope id. Fails with [`FocusError::DuplicateScope`] if the
    /// id is already known; this is a caller-configuration error and leaves
    /// runtime navigation untouched.
    pub fn register(&mut self, id: impl Into<String>) -> Result<(), FocusError> {
        let id = id.into();
        if self.registered.contains_key(&id) {
            return Err(FocusError::DuplicateScope(id));
        }
        let order = self.registered.len();
        self.registered.insert(id, order);
        Ok(())
    }

    /// True iff `id` is the currently focused (top) scope.
    pub fn is_focused(&self, id: &str) -> bool {
        self.current() == id
    }

    /// The currently focused scope id.
    pub fn current(&self) -> &str {
        // The stack is never empty; the root is pushed at construction.
        self.stack.last().expect("focus stack has a permanent root")
    }

    /// Number of scopes on the stack, root included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push `id` as the new focused scope (opening a modal, entering tab
    /// content). Pre-registration is not required.
    pub fn enter_scope(&mut self, id: impl Into<String>) {
        let id = id.into();
        tracing::debug!(scope = %id, "entering focus scope");
        self.stack.push(id);
        self.notify();
    }

    /// Pop the focused scope, moving one level toward the root. At the root
    /// this is a no-op: repeated Escape presses at the top level are routine,
    /// not an error.
    pub fn exit_one_level(&mut self) {
        if self.stack.len() > 1 {
            let left = self.stack.pop();
            tracing::debug!(scope = ?left, "exited focus scope");
            self.notify();
        }
    }

    fn notify(&self) {
        if let Some(ref observer) = self.observer {
            observer(self.current());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_root_focused_initially() {
        let focus = FocusManager::new("input");
        assert!(focus.is_focused("input"));
        assert_eq!(focus.depth(), 1);
    }

    #[test]
    fn test_enter_and_exit() {
        let mut focus = FocusManager::new("input");
        focus.enter_scope("nav_bar");
        focus.enter_scope("settings_tab");
        focus.enter_scope("confirm_modal");

        assert!(focus.is_focused("confirm_modal"));
        assert!(!focus.is_focused("input"));

        focus.exit_one_level();
        assert!(focus.is_focused("settings_tab"));
        focus.exit_one_level();
        assert!(focus.is_focused("nav_bar"));
        focus.exit_one_level();
        assert!(focus.is_focused("input"));
    }

    #[test]
    fn test_exit_at_root_is_noop() {
        let mut focus = FocusManager::new("input");
        for _ in 0..10 {
            focus.exit_one_level();
        }
        assert_eq!(focus.depth(), 1);
        assert!(focus.is_focused("input"));
    }

    #[test]
    fn test_repeated_exit_converges_to_root() {
        let mut focus = FocusManager::new("input");
        focus.enter_scope("nav_bar");
        focus.enter_scope("modal");

        // Once the root is reached it stays focused no matter how many more
        // escapes arrive.
        for _ in 0..6 {
            focus.exit_one_level();
            assert!(focus.depth() >= 1);
        }
        assert!(focus.is_focused("input"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut focus = FocusManager::new("input");
        assert!(focus.register("nav_bar").is_ok());
        assert_eq!(
            focus.register("nav_bar"),
            Err(FocusError::DuplicateScope("nav_bar".to_string()))
        );
        // The root id was registered at construction.
        assert!(focus.register("input").is_err());
    }

    #[test]
    fn test_observer_sees_new_top() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let mut focus = FocusManager::new("input");
        focus.set_observer(Box::new(move |id| {
            seen_clone.borrow_mut().push(id.to_string());
        }));

        focus.enter_scope("modal");
        focus.exit_one_level();
        focus.exit_one_level(); // no-op at root, must not fire

        assert_eq!(*seen.borrow(), vec!["modal".to_string(), "input".to_string()]);
    }

    #[test]
    fn test_unregistered_scope_can_be_entered() {
        let mut focus = FocusManager::new("input");
        focus.enter_scope("transient_popup");
        assert!(focus.is_focused("transient_popup"));
    }
}
