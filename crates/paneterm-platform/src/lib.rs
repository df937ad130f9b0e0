//! paneterm-platform: platform glue for the terminal panel.
//!
//! Detects the user's default shell and resolves the `PATH` a login shell
//! would have. A host application launched from a desktop environment
//! typically inherits a minimal `PATH` that lacks user-customized entries
//! (version managers, package managers, `~/.local/bin`), so the resolver
//! asks the shell itself and falls back to a synthesized value.

pub mod paths;
pub mod shell;

pub use paths::{PathResolver, ShellProbe, SystemShellProbe};
pub use shell::detect_shell;
