//! Raw terminal byte decoding.
//!
//! Translates unbuffered stdin chunks into [`InputEvent`]s:
//! - SGR extended mouse reports (`ESC [ < b ; x ; y M/m`)
//! - CSI and SS3 arrow/delete sequences
//! - Alt+key (ESC followed by a printable byte)
//! - Control bytes mapped back to Ctrl+letter pairs
//! - Printable ASCII and multi-byte UTF-8 characters
//!
//! `decode` is a pure function of its chunk. A sequence whose terminator is
//! missing from the chunk produces no event: fragments are dropped, not
//! buffered across calls. Unknown escape sequences are skipped the same way,
//! since terminal noise must never surface as user-visible input.

use crate::input::events::{
    InputEvent, Modifiers, MouseAction, MouseButton, SpecialKey,
};

const ESC: u8 = 0x1B;

/// Decode one chunk of raw terminal bytes into zero or more events,
/// in byte order.
pub fn decode(chunk: &[u8]) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut pos = 0;

    while pos < chunk.len() {
        match decode_one(&chunk[pos..]) {
            Step::Event(event, consumed) => {
                events.push(event);
                pos += consumed;
            }
            Step::Skip(consumed) => pos += consumed,
            // Partial sequence at the end of the chunk: drop the fragment.
            Step::Truncated => break,
        }
    }

    events
}

enum Step {
    /// Produced an event, consuming N bytes.
    Event(InputEvent, usize),
    /// Recognized but uninteresting (or malformed) bytes, consuming N.
    Skip(usize),
    /// The remainder of the chunk is an unterminated sequence.
    Truncated,
}

fn decode_one(bytes: &[u8]) -> Step {
    match bytes[0] {
        ESC => decode_escape(bytes),
        // Enter arrives as CR in raw mode, LF from pipes.
        b'\r' | b'\n' => special(SpecialKey::Return, Modifiers::NONE, 1),
        0x7F | 0x08 => special(SpecialKey::Backspace, Modifiers::NONE, 1),
        // Tab has no routing target in this core.
        b'\t' => Step::Skip(1),
        // Remaining control bytes collapse Ctrl+letter; map them back so the
        // dispatcher can match Ctrl+c, Ctrl+l, etc.
        b @ 0x01..=0x1A => {
            let ch = (b - 0x01 + b'a') as char;
            Step::Event(InputEvent::character(ch, Modifiers::ctrl()), 1)
        }
        0x20..=0x7E => Step::Event(
            InputEvent::character(bytes[0] as char, Modifiers::NONE),
            1,
        ),
        0x80..=0xFF => decode_utf8(bytes),
        _ => Step::Skip(1),
    }
}

fn decode_escape(bytes: &[u8]) -> Step {
    if bytes.len() < 2 {
        // A lone ESC byte is the Escape key itself.
        return special(SpecialKey::Escape, Modifiers::NONE, 1);
    }

    match bytes[1] {
        b'[' => decode_csi(bytes),
        b'O' => decode_ss3(bytes),
        ESC => special(SpecialKey::Escape, Modifiers::alt(), 2),
        // ESC + printable is Alt+key.
        b @ 0x20..=0x7E => Step::Event(InputEvent::character(b as char, Modifiers::alt()), 2),
        _ => special(SpecialKey::Escape, Modifiers::NONE, 1),
    }
}

fn decode_csi(bytes: &[u8]) -> Step {
    if bytes.len() < 3 {
        return Step::Truncated;
    }

    if bytes[2] == b'<' {
        return decode_sgr_mouse(bytes);
    }

    // Find the final byte (0x40-0x7E) that closes the sequence.
    let mut end = 2;
    while end < bytes.len() && !(0x40..=0x7E).contains(&bytes[end]) {
        end += 1;
    }
    if end >= bytes.len() {
        return Step::Truncated;
    }

    let consumed = end + 1;
    match bytes[end] {
        b'A' => special(SpecialKey::ArrowUp, Modifiers::NONE, consumed),
        b'B' => special(SpecialKey::ArrowDown, Modifiers::NONE, consumed),
        b'C' => special(SpecialKey::ArrowRight, Modifiers::NONE, consumed),
        b'D' => special(SpecialKey::ArrowLeft, Modifiers::NONE, consumed),
        b'~' if &bytes[2..end] == b"3" => {
            special(SpecialKey::Delete, Modifiers::NONE, consumed)
        }
        // Any other CSI sequence is terminal noise for this core.
        _ => Step::Skip(consumed),
    }
}

fn decode_ss3(bytes: &[u8]) -> Step {
    if bytes.len() < 3 {
        return Step::Truncated;
    }
    match bytes[2] {
        b'A' => special(SpecialKey::ArrowUp, Modifiers::NONE, 3),
        b'B' => special(SpecialKey::ArrowDown, Modifiers::NONE, 3),
        b'C' => special(SpecialKey::ArrowRight, Modifiers::NONE, 3),
        b'D' => special(SpecialKey::ArrowLeft, Modifiers::NONE, 3),
        _ => Step::Skip(3),
    }
}

/// SGR mouse report: `ESC [ < b ; x ; y` terminated by `M` (press/scroll)
/// or `m` (release). Coordinates are the 1-based column/row as reported.
fn decode_sgr_mouse(bytes: &[u8]) -> Step {
    let start = 3; // past ESC [ <
    let mut end = start;
    while end < bytes.len() && bytes[end] != b'M' && bytes[end] != b'm' {
        end += 1;
    }
    if end >= bytes.len() {
        return Step::Truncated;
    }

    let is_release = bytes[end] == b'm';
    let consumed = end + 1;

    let mut fields = bytes[start..end]
        .split(|&b| b == b';')
        .map(parse_decimal);
    let (b, x, y) = match (fields.next(), fields.next(), fields.next()) {
        (Some(Some(b)), Some(Some(x)), Some(Some(y))) => (b, x, y),
        _ => return Step::Skip(consumed),
    };

    let mut bits = b;
    let scroll = bits & 64 != 0;
    bits &= !64;
    // Drag flag: cleared without changing the decoded action or button.
    bits &= !32;

    let modifiers = Modifiers {
        ctrl: bits & 16 != 0,
        alt: bits & 8 != 0,
        shift: bits & 4 != 0,
    };
    let button_code = bits & 3;

    let (action, button) = if scroll {
        let action = if button_code == 0 {
            MouseAction::ScrollUp
        } else {
            MouseAction::ScrollDown
        };
        (action, MouseButton::None)
    } else {
        let action = if is_release {
            MouseAction::Up
        } else {
            MouseAction::Down
        };
        let button = match button_code {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        };
        (action, button)
    };

    Step::Event(InputEvent::mouse(x, y, action, button, modifiers), consumed)
}

fn parse_decimal(field: &[u8]) -> Option<u16> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut value: u16 = 0;
    for &b in field {
        value = value.checked_mul(10)?.checked_add((b - b'0') as u16)?;
    }
    Some(value)
}

fn decode_utf8(bytes: &[u8]) -> Step {
    let first = bytes[0];
    let len = if first & 0xE0 == 0xC0 {
        2
    } else if first & 0xF0 == 0xE0 {
        3
    } else if first & 0xF8 == 0xF0 {
        4
    } else {
        // Stray continuation byte.
        return Step::Skip(1);
    };

    if bytes.len() < len {
        return Step::Truncated;
    }

    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Step::Event(InputEvent::character(ch, Modifiers::NONE), len),
            None => Step::Skip(len),
        },
        Err(_) => Step::Skip(len),
    }
}

fn special(key: SpecialKey, modifiers: Modifiers, consumed: usize) -> Step {
    Step::Event(InputEvent::special(key, modifiers), consumed)
}
