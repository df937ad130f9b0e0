//! Shell detection.
//!
//! Determines which shell to run inside the terminal panel when the caller
//! does not supply an explicit override.

/// Detect the user's default shell.
///
/// - On Unix: reads the `SHELL` environment variable, falling back to `/bin/sh`.
/// - On Windows: reads the `COMSPEC` environment variable, falling back to `cmd.exe`.
pub fn detect_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }

    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }

    #[cfg(not(any(unix, windows)))]
    {
        "/bin/sh".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_shell_returns_non_empty() {
        let shell = detect_shell();
        assert!(!shell.is_empty(), "detect_shell() should not be empty");
    }

    #[test]
    #[cfg(unix)]
    fn detect_shell_prefers_shell_var() {
        // $SHELL is set in any normal login environment; when it is, the
        // detected shell must match it exactly.
        if let Ok(from_env) = std::env::var("SHELL") {
            assert_eq!(detect_shell(), from_env);
        }
    }
}
