//! Terminal mode control.
//!
//! The core never emits escape sequences itself: raw mode and SGR mouse
//! reporting are switched through the [`TerminalModeController`] boundary.
//! The crossterm implementation below negotiates them with the terminal
//! device, and [`TerminalModeGuard`] guarantees release on every exit path —
//! normal shutdown, errors, or raw mode turning out to be unsupported.

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io;

/// Scoped enable/disable of raw mode and mouse reporting. Both operations
/// must be idempotent: enabling twice or disabling twice is harmless.
pub trait TerminalModeController {
    fn enable(&mut self) -> Result<()>;
    fn disable(&mut self) -> Result<()>;
}

/// Crossterm-backed controller: raw mode plus (optionally) mouse capture,
/// which negotiates the SGR `?1006` extended reporting the decoder consumes.
pub struct CrosstermModeController {
    active: bool,
    mouse: bool,
}

impl CrosstermModeController {
    pub fn new(mouse: bool) -> Self {
        Self {
            active: false,
            mouse,
        }
    }
}

impl TerminalModeController for CrosstermModeController {
    fn enable(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        enable_raw_mode().context("Failed to enable raw mode")?;
        if self.mouse {
            execute!(io::stdout(), EnableMouseCapture)
                .context("Failed to enable mouse capture")?;
        }
        self.active = true;
        tracing::debug!(mouse = self.mouse, "terminal raw mode enabled");
        Ok(())
    }

    fn disable(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        if self.mouse {
            execute!(io::stdout(), DisableMouseCapture)
                .context("Failed to disable mouse capture")?;
        }
        disable_raw_mode().context("Failed to disable raw mode")?;
        self.active = false;
        tracing::debug!("terminal raw mode disabled");
        Ok(())
    }
}

/// RAII wrapper: acquires the terminal mode on construction and releases it
/// on drop, so a panic or early `?` return still restores the terminal.
pub struct TerminalModeGuard {
    controller: Box<dyn TerminalModeController>,
}

impl TerminalModeGuard {
    pub fn acquire(mut controller: Box<dyn TerminalModeController>) -> Result<Self> {
        controller.enable()?;
        Ok(Self { controller })
    }

    /// Explicit release for the normal shutdown path, where the caller wants
    /// to see (and log) a failure instead of swallowing it in Drop.
    pub fn release(mut self) -> Result<()> {
        self.controller.disable()
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        if let Err(e) = self.controller.disable() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}
