//! The PTY session manager.
//!
//! One [`SessionManager`] owns at most one live child process at a time and
//! mediates all I/O with it. Child output passes through the escape
//! sanitizer and fans out to data consumers in registration order; the exit
//! record is delivered to exit consumers exactly once. Spawning while a
//! session is live tears the old one down first, so events are never
//! delivered twice or to the wrong session.
//!
//! Consumers run on the backend's event thread while the registry lock is
//! held: a consumer must not register or remove consumers, nor call the
//! manager's mutating operations, from inside delivery.

mod options;

pub use options::{SpawnOptions, DEFAULT_COLS, DEFAULT_ROWS};

use std::sync::Arc;

use parking_lot::Mutex;

use paneterm_platform::{detect_shell, PathResolver};

use crate::backend::{EventSink, ExitRecord, PtyBackend, PtyChannel, PtySpawnSpec};
use crate::error::SessionError;
use crate::sanitize::sanitize_chunk;
use crate::tokenize::split_command;

/// Terminal type advertised to the child.
const TERM_VALUE: &str = "xterm-256color";

/// Color capability advertised to the child.
const COLORTERM_VALUE: &str = "truecolor";

/// Terminal family advertised to the child. CLIs that special-case the
/// VS Code terminal family skip kitty-keyboard negotiation under it, which
/// the display surface cannot parse.
const TERM_PROGRAM_VALUE: &str = "vscode";

/// Consumer of sanitized output chunks.
pub type DataCallback = Box<dyn FnMut(&[u8]) + Send>;

/// Consumer of the exit record.
pub type ExitCallback = Box<dyn FnMut(ExitRecord) + Send>;

// =============================================================================
// CALLBACK REGISTRY
// =============================================================================

/// Registered consumers plus the generation guard.
///
/// `generation` changes on every spawn and kill; an event carrying a stale
/// generation belongs to a torn-down session and is dropped before any
/// consumer runs.
struct CallbackRegistry {
    generation: u64,
    data: Vec<DataCallback>,
    exit: Vec<ExitCallback>,
    exit_delivered: bool,
    live: bool,
}

impl CallbackRegistry {
    fn new() -> Self {
        Self {
            generation: 0,
            data: Vec::new(),
            exit: Vec::new(),
            exit_delivered: false,
            live: false,
        }
    }
}

/// Sink installed into the backend for one spawned session.
struct ManagerSink {
    registry: Arc<Mutex<CallbackRegistry>>,
    generation: u64,
}

impl EventSink for ManagerSink {
    fn on_data(&self, data: &[u8]) {
        let clean = sanitize_chunk(data);
        // A chunk that was all unsupported sequences is dropped silently.
        if clean.is_empty() {
            return;
        }
        let mut registry = self.registry.lock();
        if registry.generation != self.generation {
            return;
        }
        for callback in registry.data.iter_mut() {
            callback(&clean);
        }
    }

    fn on_exit(&self, exit: ExitRecord) {
        let mut registry = self.registry.lock();
        if registry.generation != self.generation || registry.exit_delivered {
            return;
        }
        registry.exit_delivered = true;
        registry.live = false;
        for callback in registry.exit.iter_mut() {
            callback(exit);
        }
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Owns the single live child-process/PTY pair and mediates all I/O.
pub struct SessionManager {
    backend: Box<dyn PtyBackend>,
    resolver: Arc<PathResolver>,
    registry: Arc<Mutex<CallbackRegistry>>,
    channel: Option<Box<dyn PtyChannel>>,
}

impl SessionManager {
    pub fn new(backend: Box<dyn PtyBackend>, resolver: Arc<PathResolver>) -> Self {
        Self {
            backend,
            resolver,
            registry: Arc::new(Mutex::new(CallbackRegistry::new())),
            channel: None,
        }
    }

    /// Spawn a new session.
    ///
    /// Tears down any prior session first: sessions never overlap within
    /// one manager. With `options.command` set, the first token runs
    /// directly as the program (no shell, no rc files); otherwise the
    /// effective shell runs interactively with no arguments.
    ///
    /// On failure no session exists; the host should write
    /// [`crate::error_banner`] to the display surface.
    pub fn spawn(&mut self, options: &SpawnOptions) -> Result<(), SessionError> {
        if self.channel.is_some() {
            self.kill();
        }

        if !options.cwd.is_dir() {
            return Err(SessionError::WorkingDirMissing(options.cwd.clone()));
        }
        if options.cols == 0 || options.rows == 0 {
            return Err(SessionError::SpawnFailed(format!(
                "terminal size must be non-zero, got {}x{}",
                options.cols, options.rows
            )));
        }

        let shell = options
            .shell
            .clone()
            .unwrap_or_else(detect_shell);

        let path = match &options.resolved_path {
            Some(path) => path.clone(),
            None => self.resolver.resolve(&shell),
        };

        let (program, args) = match &options.command {
            Some(command) => {
                let mut tokens = split_command(command)?;
                let program = tokens.remove(0);
                (program, tokens)
            }
            None => (shell, Vec::new()),
        };

        let spec = PtySpawnSpec {
            program,
            args,
            cwd: options.cwd.clone(),
            env: vec![
                ("TERM".to_string(), TERM_VALUE.to_string()),
                ("COLORTERM".to_string(), COLORTERM_VALUE.to_string()),
                ("TERM_PROGRAM".to_string(), TERM_PROGRAM_VALUE.to_string()),
                ("PATH".to_string(), path),
            ],
            cols: options.cols,
            rows: options.rows,
        };

        let generation = {
            let mut registry = self.registry.lock();
            registry.generation = registry.generation.wrapping_add(1);
            registry.exit_delivered = false;
            registry.generation
        };

        let sink = ManagerSink {
            registry: self.registry.clone(),
            generation,
        };

        let channel = self.backend.open(spec, Box::new(sink))?;
        self.channel = Some(channel);
        self.registry.lock().live = true;
        tracing::debug!(cols = options.cols, rows = options.rows, "session spawned");
        Ok(())
    }

    /// Forward raw bytes to the child's input stream.
    ///
    /// No-op with no live session; late failures from a child that just
    /// exited are swallowed.
    pub fn write(&mut self, data: &[u8]) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        if let Err(e) = channel.write(data) {
            tracing::debug!("pty write failed (process may have exited): {e}");
        }
    }

    /// Update the PTY window size.
    ///
    /// Never raises: a resize racing natural process exit is benign.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        if let Err(e) = channel.resize(cols, rows) {
            tracing::debug!("pty resize failed (process may have exited): {e}");
        }
    }

    /// Register a consumer for sanitized output chunks.
    ///
    /// All registered consumers fire for each chunk, in registration order.
    pub fn on_data(&self, callback: impl FnMut(&[u8]) + Send + 'static) {
        self.registry.lock().data.push(Box::new(callback));
    }

    /// Register a consumer for the exit record.
    pub fn on_exit(&self, callback: impl FnMut(ExitRecord) + Send + 'static) {
        self.registry.lock().exit.push(Box::new(callback));
    }

    /// Terminate the session and clear all registered consumers.
    ///
    /// Idempotent. Once this returns, no previously registered consumer
    /// can fire again, even for events already in flight from the killed
    /// child: acquiring the registry lock waits out in-flight delivery,
    /// and the generation bump orphans anything still queued.
    pub fn kill(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.kill();
        }
        let mut registry = self.registry.lock();
        registry.generation = registry.generation.wrapping_add(1);
        registry.data.clear();
        registry.exit.clear();
        registry.exit_delivered = false;
        registry.live = false;
    }

    /// Write `text` followed by a carriage return, as if typed and entered.
    pub fn send_command(&mut self, text: &str) {
        let mut line = Vec::with_capacity(text.len() + 1);
        line.extend_from_slice(text.as_bytes());
        line.push(b'\r');
        self.write(&line);
    }

    /// Write raw text with no trailing terminator.
    pub fn send_text(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    /// Whether a spawned child is running (neither exited nor killed).
    pub fn is_live(&self) -> bool {
        self.channel.is_some() && self.registry.lock().live
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.kill();
    }
}

// =============================================================================
// TESTS
// =============================================================================
