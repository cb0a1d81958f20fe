//! Duplex - split-pane chat + embedded terminal client
//!
//! The binary wires the terminal interaction core together: raw stdin bytes
//! are decoded into events and routed through the session's focus/window
//! state machine, while submissions and terminal signals are handed to
//! collaborator tasks over channels. Rendering, command execution, and chat
//! backends are external collaborators reached through those channels.

mod config;
mod core;
mod input;
mod terminal;

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::core::{ChatSubmitter, MouseSink, Session, TerminalCommandExecutor};
use crate::input::events::MouseEvent;
use crate::terminal::{CrosstermModeController, TerminalModeGuard};

#[derive(ClapParser)]
#[command(name = "duplex")]
#[command(about = "Split-pane chat + embedded terminal client", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.duplex)
    /// Can also be set via DUPLEX_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Disable mouse reporting for this session
    #[arg(long)]
    no_mouse: bool,
}

/// Requests forwarded to the embedded-terminal collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TerminalRequest {
    Run(String),
    Interrupt,
    Clear,
}

/// Chat handler backed by an unbounded channel to the chat task.
struct ChannelChat {
    tx: mpsc::UnboundedSender<String>,
}

impl ChatSubmitter for ChannelChat {
    fn submit_chat(&mut self, line: &str) -> Result<()> {
        self.tx
            .send(line.to_string())
            .map_err(|_| anyhow!("chat collaborator is gone"))
    }
}

/// Terminal handler backed by an unbounded channel to the command task.
struct ChannelTerminal {
    tx: mpsc::UnboundedSender<TerminalRequest>,
}

impl TerminalCommandExecutor for ChannelTerminal {
    fn run_command(&mut self, line: &str) -> Result<()> {
        self.tx
            .send(TerminalRequest::Run(line.to_string()))
            .map_err(|_| anyhow!("terminal collaborator is gone"))
    }

    fn interrupt(&mut self) {
        // Signals are fire-and-forget; a vanished collaborator is logged by
        // the submit path, not here.
        let _ = self.tx.send(TerminalRequest::Interrupt);
    }

    fn clear(&mut self) {
        let _ = self.tx.send(TerminalRequest::Clear);
    }
}

/// Mouse events go to the rendering layer for hit-testing; with no renderer
/// attached they are only traced.
struct TraceMouseSink;

impl MouseSink for TraceMouseSink {
    fn handle_mouse(&mut self, event: MouseEvent) {
        tracing::trace!(?event, "mouse event forwarded to render layer");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set custom data directory if specified (via CLI or environment variable)
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var("DUPLEX_DIR", data_dir);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    init_logging(&config)?;

    if let Some(data_dir) = &cli.data_dir {
        tracing::info!("Using custom data directory: {:?}", data_dir);
    }

    let mouse_enabled = config.ui.mouse_enabled && !cli.no_mouse;

    // Use tokio runtime for the stdin pump and collaborator tasks
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_session(config, mouse_enabled))
}

/// Initialize logging to a file (use RUST_LOG to override the configured
/// level). Raw-mode apps can't log to stdout.
fn init_logging(config: &Config) -> Result<()> {
    let log_path = config.log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.filter.clone())),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();
    Ok(())
}

/// Async session loop: decode raw chunks, dispatch, drain collaborators.
async fn run_session(config: Config, mouse_enabled: bool) -> Result<()> {
    let (chat_tx, mut chat_rx) = mpsc::unbounded_channel::<String>();
    let (term_tx, mut term_rx) = mpsc::unbounded_channel::<TerminalRequest>();

    let mut session = Session::new(
        config,
        Box::new(ChannelChat { tx: chat_tx }),
        Box::new(ChannelTerminal { tx: term_tx }),
        Box::new(TraceMouseSink),
    )?;

    // Collaborator stubs: the chat backend and command executor live outside
    // this core; here they only acknowledge what they received.
    let chat_task = tokio::spawn(async move {
        while let Some(line) = chat_rx.recv().await {
            tracing::info!(line = %line, "chat submission");
        }
    });
    let term_task = tokio::spawn(async move {
        while let Some(request) = term_rx.recv().await {
            match request {
                TerminalRequest::Run(line) => tracing::info!(line = %line, "terminal command"),
                TerminalRequest::Interrupt => tracing::info!("terminal interrupt"),
                TerminalRequest::Clear => tracing::info!("terminal clear"),
            }
        }
    });

    // Raw mode + mouse reporting, held for the whole session and released on
    // every exit path by the guard.
    let guard = TerminalModeGuard::acquire(Box::new(CrosstermModeController::new(mouse_enabled)))?;

    let mut stdin = tokio::io::stdin();
    let mut buf = vec![0u8; session.config.ui.read_buffer_size.max(16)];

    tracing::info!("session started");
    while session.running {
        let n = match stdin.read(&mut buf).await {
            Ok(0) => break, // stdin closed
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };

        session.process_chunk(&buf[..n]);

        if let Some(message) = session.take_status_error() {
            tracing::error!(%message, "submission failed");
        }
        if session.needs_render {
            // Rendering is an external collaborator; expose the state it
            // would read and clear the dirty flag.
            tracing::trace!(
                focus = %session.focus.current(),
                terminal_active = session.router.is_terminal_active(),
                line = %session.router.line(),
                "state changed"
            );
            session.needs_render = false;
        }
    }

    guard.release()?;
    chat_task.abort();
    term_task.abort();
    tracing::info!("session ended");
    Ok(())
}
