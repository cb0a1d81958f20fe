//! Frontend-agnostic input events produced by the raw-byte decoder.
//!
//! The decoder translates terminal byte streams into this one event shape so
//! the dispatch layer never touches escape sequences or control bytes
//! directly.

/// Modifier keys attached to a key or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }
}

/// Non-character keys the core routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialKey {
    Return,
    Escape,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    #[default]
    None,
}

/// A decoded keyboard event.
///
/// Exactly one of `ch` / `special` carries the key identity: special keys
/// decode with `ch == None`, printable input decodes with
/// `special == SpecialKey::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub ch: Option<char>,
    pub modifiers: Modifiers,
    pub special: SpecialKey,
}

/// What the mouse did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    ScrollUp,
    ScrollDown,
    Move,
}

/// Which button was involved. `None` for scroll events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    None,
}

/// A decoded mouse event. Coordinates are 0-based column/row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub action: MouseAction,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

/// Unified event stream consumed by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl InputEvent {
    /// Create a printable-character key event.
    pub fn character(ch: char, modifiers: Modifiers) -> Self {
        Self::Key(KeyEvent {
            ch: Some(ch),
            modifiers,
            special: SpecialKey::None,
        })
    }

    /// Create a special-key event.
    pub fn special(special: SpecialKey, modifiers: Modifiers) -> Self {
        Self::Key(KeyEvent {
            ch: None,
            modifiers,
            special,
        })
    }

    /// Create a mouse event.
    pub fn mouse(
        x: u16,
        y: u16,
        action: MouseAction,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> Self {
        Self::Mouse(MouseEvent {
            x,
            y,
            action,
            button,
            modifiers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let key = InputEvent::character('a', Modifiers::NONE);
        assert!(matches!(
            key,
            InputEvent::Key(KeyEvent { ch: Some('a'), .. })
        ));

        let esc = InputEvent::special(SpecialKey::Escape, Modifiers::NONE);
        assert!(matches!(
            esc,
            InputEvent::Key(KeyEvent {
                ch: None,
                special: SpecialKey::Escape,
                ..
            })
        ));

        let scroll = InputEvent::mouse(3, 3, MouseAction::ScrollUp, MouseButton::None, Modifiers::NONE);
        assert!(matches!(
            scroll,
            InputEvent::Mouse(MouseEvent {
                button: MouseButton::None,
                ..
            })
        ));
    }

    #[test]
    fn test_ctrl_modifier_helper() {
        let m = Modifiers::ctrl();
        assert!(m.ctrl);
        assert!(!m.shift);
        assert!(!m.alt);
    }
}
