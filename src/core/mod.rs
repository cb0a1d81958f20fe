//! Core interaction logic
//!
//! Focus hierarchy, window routing, and event dispatch. NO rendering code
//! and no escape sequences: this layer consumes decoded events and updates
//! state that frontends read each frame.

pub mod dispatcher;
pub mod focus;
pub mod session;
pub mod window;

pub use dispatcher::{
    ChatSubmitter, DispatchOutcome, InputDispatcher, MouseSink, TerminalCommandExecutor,
};
pub use focus::{FocusError, FocusManager};
pub use session::Session;
pub use window::{ActiveWindow, SubmitTarget, Submission, WindowRouter};
