//! Spawn options for a terminal session.

use std::path::PathBuf;

/// Default terminal columns.
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal rows.
pub const DEFAULT_ROWS: u16 = 24;

/// Caller-supplied parameters for one spawn.
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    /// Shell override. `None` means the user's default shell.
    pub shell: Option<String>,
    /// Working directory; must exist at spawn time.
    pub cwd: PathBuf,
    /// Initial terminal size.
    pub cols: u16,
    pub rows: u16,
    /// Direct command to execute instead of an interactive shell. Bypasses
    /// the shell entirely, so no rc files run.
    pub command: Option<String>,
    /// Pre-resolved `PATH` value; skips the resolver when set.
    pub resolved_path: Option<String>,
}

impl SpawnOptions {
    /// Options for an interactive shell in `cwd` at the default size.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            shell: None,
            cwd: cwd.into(),
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            command: None,
            resolved_path: None,
        }
    }

    /// Override the shell.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Set the initial size.
    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Execute a direct command instead of an interactive shell.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Supply an already-resolved `PATH`.
    pub fn with_resolved_path(mut self, path: impl Into<String>) -> Self {
        self.resolved_path = Some(path.into());
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
