//! Session error types.

use std::path::PathBuf;

/// Errors from spawning and driving a PTY session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The PTY capability itself could not be brought up (no pseudo-terminal
    /// device could be allocated). Distinct from a bad spawn request.
    #[error("pty backend unavailable: {0}; check that the host platform exposes a pseudo-terminal device (/dev/ptmx on unix, ConPTY on windows 10+)")]
    BackendUnavailable(String),

    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("working directory does not exist: {}", .0.display())]
    WorkingDirMissing(PathBuf),

    #[error("command is empty")]
    EmptyCommand,

    #[error("unbalanced quote in command: {0}")]
    UnbalancedQuote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Format an error as a clearly marked banner for the display surface.
///
/// Spawn failures happen when the terminal is already visible but empty, so
/// the host writes this to the surface instead of dropping the error.
pub fn error_banner(err: &SessionError) -> String {
    format!("\r\n\x1b[1;31m[paneterm] {err}\x1b[0m\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SessionError::SpawnFailed("no such file".into());
        assert_eq!(err.to_string(), "failed to spawn process: no such file");

        let err = SessionError::WorkingDirMissing(PathBuf::from("/tmp/gone"));
        assert_eq!(err.to_string(), "working directory does not exist: /tmp/gone");

        let err = SessionError::UnbalancedQuote("echo \"hi".into());
        assert_eq!(err.to_string(), "unbalanced quote in command: echo \"hi");
    }

    #[test]
    fn backend_unavailable_names_remediation() {
        let err = SessionError::BackendUnavailable("openpty failed".into());
        let msg = err.to_string();
        assert!(msg.contains("openpty failed"));
        assert!(msg.contains("/dev/ptmx"), "message should name the device: {msg}");
    }

    #[test]
    fn banner_is_marked_and_framed() {
        let banner = error_banner(&SessionError::EmptyCommand);
        assert!(banner.starts_with("\r\n"));
        assert!(banner.contains("[paneterm]"));
        assert!(banner.contains("command is empty"));
        assert!(banner.ends_with("\x1b[0m\r\n"));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SessionError = io_err.into();
        assert!(matches!(err, SessionError::Io(_)));
    }
}
