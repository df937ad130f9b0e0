//! PTY capability provider.
//!
//! The session manager depends only on the traits here, never on the
//! native PTY crate directly. [`NativePtyBackend`] is the one concrete
//! implementation; tests substitute an in-memory fake.

mod native;

#[cfg(test)]
pub(crate) mod fake;

pub use native::NativePtyBackend;

use std::path::PathBuf;

use crate::error::SessionError;

/// Everything needed to launch one child under a PTY.
#[derive(Debug, Clone)]
pub struct PtySpawnSpec {
    /// Program to execute (a shell, or the first token of a direct command).
    pub program: String,
    /// Arguments to the program.
    pub args: Vec<String>,
    /// Working directory for the child.
    pub cwd: PathBuf,
    /// Environment overrides applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Initial terminal size.
    pub cols: u16,
    pub rows: u16,
}

/// How a child process ended.
///
/// Produced exactly once per session. The native backend cannot portably
/// observe the raising signal, so it reports `signal: None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRecord {
    pub code: i32,
    pub signal: Option<i32>,
}

/// Receives child output and the exit record.
///
/// Called from the backend's event thread; implementations must not block.
pub trait EventSink: Send + Sync {
    fn on_data(&self, data: &[u8]);
    fn on_exit(&self, exit: ExitRecord);
}

/// Handle to one live PTY child.
pub trait PtyChannel: Send {
    /// Send bytes to the child's input stream.
    fn write(&mut self, data: &[u8]) -> Result<(), SessionError>;

    /// Update the PTY window size.
    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), SessionError>;

    /// Terminate the child. Errors are swallowed; the process may already
    /// be dead.
    fn kill(&mut self);
}

/// Creates PTY channels.
pub trait PtyBackend {
    /// Launch `spec` under a fresh PTY, delivering output and the exit
    /// record to `sink`.
    fn open(
        &self,
        spec: PtySpawnSpec,
        sink: Box<dyn EventSink>,
    ) -> Result<Box<dyn PtyChannel>, SessionError>;
}
