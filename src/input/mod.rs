//! Raw terminal input: decoded event types and the byte-stream decoder.

pub mod decoder;
pub mod events;

pub use decoder::decode;
pub use events::{InputEvent, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent, SpecialKey};
