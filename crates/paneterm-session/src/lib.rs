//! paneterm-session: PTY session management for the terminal panel.
//!
//! Bridges a shell (or direct command) running under a pseudo-terminal to a
//! terminal-emulator display surface. Input flows from the surface into
//! [`SessionManager::write`]; output flows from the child through the
//! escape sanitizer to registered data consumers.
//!
//! # Architecture
//!
//! - [`backend`] — capability-provider interface over the native PTY
//!   ([`backend::NativePtyBackend`] wraps `portable-pty`).
//! - [`session`] — [`SessionManager`]: one live child per manager,
//!   spawn/write/resize/kill lifecycle, ordered callback fan-out.
//! - [`sanitize`] — strips control sequences the surface cannot parse.
//! - [`tokenize`] — quote-aware splitting of direct commands.

pub mod backend;
pub mod error;
pub mod sanitize;
pub mod session;
pub mod tokenize;

pub use backend::{ExitRecord, NativePtyBackend, PtyBackend};
pub use error::{error_banner, SessionError};
pub use sanitize::sanitize_chunk;
pub use session::{SessionManager, SpawnOptions, DEFAULT_COLS, DEFAULT_ROWS};
pub use tokenize::split_command;
