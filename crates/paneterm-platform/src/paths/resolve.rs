//! The `PathResolver`: cached login-shell `PATH` queries.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::fallback::fallback_path;

/// Upper bound on a single shell query. Interactive shells with broken rc
/// files or prompts that wait for input would otherwise hang the spawn.
pub const PATH_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// The command each probed shell runs to print its effective `PATH`.
const PRINT_PATH_COMMAND: &str = "echo $PATH";

/// Poll interval while waiting for a probed shell to exit.
const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(10);

// =============================================================================
// SHELL PROBE
// =============================================================================

/// Runs a shell once to print its `PATH`.
///
/// Behind a trait so tests can substitute a counting fake and verify the
/// resolver's caching and fallback chain without touching the system.
pub trait ShellProbe: Send + Sync {
    /// Invoke `shell` with `mode_flag` (e.g. `-ilc`) and the print-`PATH`
    /// query, bounded by `timeout`.
    ///
    /// Returns the printed value on a clean zero exit, `None` on non-zero
    /// exit, timeout, or spawn failure.
    fn print_path(&self, shell: &str, mode_flag: &str, timeout: Duration) -> Option<String>;
}

/// Probe that runs the real shell via `std::process`.
pub struct SystemShellProbe;

impl ShellProbe for SystemShellProbe {
    fn print_path(&self, shell: &str, mode_flag: &str, timeout: Duration) -> Option<String> {
        let mut child = Command::new(shell)
            .arg(mode_flag)
            .arg(PRINT_PATH_COMMAND)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| tracing::debug!("PATH probe spawn failed for {shell}: {e}"))
            .ok()?;

        // Poll with a deadline rather than blocking in wait(): an
        // interactive shell stuck at a prompt never exits on its own.
        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        tracing::debug!("PATH probe {shell} {mode_flag} exited {status}");
                        return None;
                    }
                    break;
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        tracing::debug!("PATH probe {shell} {mode_flag} timed out");
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    std::thread::sleep(PROBE_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::debug!("PATH probe wait failed for {shell}: {e}");
                    let _ = child.kill();
                    return None;
                }
            }
        }

        let mut output = String::new();
        child.stdout.take()?.read_to_string(&mut output).ok()?;

        // rc files may print banners before the query runs; the PATH is the
        // last non-empty line.
        output
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

// =============================================================================
// PATH RESOLVER
// =============================================================================

/// Resolves the `PATH` a user's login shell would have, caching the result.
///
/// One long-lived instance per process, shared across session managers.
/// The cache holds whole strings swapped under a mutex, so readers never
/// observe a partially written value. Resolution cannot fail: every probe
/// failure falls through to the synthesized fallback.
pub struct PathResolver {
    probe: Box<dyn ShellProbe>,
    cache: Mutex<Option<String>>,
}

impl PathResolver {
    /// Create a resolver backed by the real system shell.
    pub fn new() -> Self {
        Self::with_probe(Box::new(SystemShellProbe))
    }

    /// Create a resolver with an injected probe (used by tests).
    pub fn with_probe(probe: Box<dyn ShellProbe>) -> Self {
        Self {
            probe,
            cache: Mutex::new(None),
        }
    }

    /// Resolve the login-shell `PATH` for `shell`.
    ///
    /// Short-circuits on the cached value. Otherwise tries the shell in
    /// login + interactive mode, then login-only mode, then synthesizes a
    /// fallback. Whatever it returns is cached until [`Self::invalidate`].
    pub fn resolve(&self, shell: &str) -> String {
        if let Some(cached) = self.cache.lock().clone() {
            return cached;
        }

        let resolved = self.resolve_uncached(shell);
        *self.cache.lock() = Some(resolved.clone());
        resolved
    }

    /// Clear the cached value, forcing re-resolution on the next call.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    #[cfg(unix)]
    fn resolve_uncached(&self, shell: &str) -> String {
        // Login + interactive first: some setups only extend PATH in
        // interactive rc files. Login-only second for shells whose
        // interactive startup is broken.
        for mode_flag in ["-ilc", "-lc"] {
            if let Some(path) = self.probe.print_path(shell, mode_flag, PATH_QUERY_TIMEOUT) {
                if !path.is_empty() {
                    tracing::debug!("resolved PATH via {shell} {mode_flag}");
                    return path;
                }
            }
        }

        tracing::debug!("shell PATH query failed for {shell}, using fallback");
        fallback_path()
    }

    #[cfg(not(unix))]
    fn resolve_uncached(&self, _shell: &str) -> String {
        // No login-shell convention to probe; the inherited PATH merged
        // with well-known tool directories is the best available answer.
        fallback_path()
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
