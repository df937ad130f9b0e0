//! Login-shell `PATH` resolution with a process-wide cache.
//!
//! The resolver queries the user's shell in login + interactive mode (then
//! login-only mode) for its `PATH`, and synthesizes a well-known fallback
//! when both queries fail. The result is cached until explicitly
//! invalidated, so at most one shell round-trip happens per process under
//! normal operation.

mod fallback;
mod resolve;

pub use fallback::fallback_path;
pub use resolve::{PathResolver, ShellProbe, SystemShellProbe, PATH_QUERY_TIMEOUT};
