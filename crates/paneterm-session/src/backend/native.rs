//! Native PTY backend over `portable-pty`.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};

use super::{EventSink, ExitRecord, PtyChannel, PtySpawnSpec};
use crate::error::SessionError;

/// Bytes read from the PTY per loop iteration.
const PTY_READ_CHUNK: usize = 8_192;

/// How long to wait for an exit status after the PTY reader hits EOF.
/// A child can close its terminal and linger; past this we stop waiting.
const EXIT_WAIT_GRACE: Duration = Duration::from_secs(5);

/// Poll interval while waiting for the exit status.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit code reported when the real status could not be observed.
const UNKNOWN_EXIT_CODE: i32 = -1;

type SharedChild = Arc<Mutex<Box<dyn Child + Send + Sync>>>;

/// Backend that spawns real processes under the OS pseudo-terminal.
pub struct NativePtyBackend;

impl NativePtyBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativePtyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl super::PtyBackend for NativePtyBackend {
    fn open(
        &self,
        spec: PtySpawnSpec,
        sink: Box<dyn EventSink>,
    ) -> Result<Box<dyn PtyChannel>, SessionError> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: spec.rows,
                cols: spec.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SessionError::BackendUnavailable(format!("failed to open PTY: {e}")))?;

        let mut cmd = CommandBuilder::new(&spec.program);
        cmd.args(&spec.args);
        cmd.cwd(&spec.cwd);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SessionError::SpawnFailed(format!("{}: {e}", spec.program)))?;

        // Only the master side is needed from here on.
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| SessionError::SpawnFailed(format!("failed to take PTY writer: {e}")))?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SessionError::SpawnFailed(format!("failed to clone PTY reader: {e}")))?;

        let child: SharedChild = Arc::new(Mutex::new(child));

        spawn_reader_thread(reader, child.clone(), sink)?;

        Ok(Box::new(NativePtyChannel {
            master: pair.master,
            writer,
            child,
        }))
    }
}

/// Background thread: pump output chunks into the sink, then report exit.
fn spawn_reader_thread(
    mut reader: Box<dyn Read + Send>,
    child: SharedChild,
    sink: Box<dyn EventSink>,
) -> Result<(), SessionError> {
    std::thread::Builder::new()
        .name("pty-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; PTY_READ_CHUNK];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break, // EOF, child side closed
                    Ok(n) => sink.on_data(&buf[..n]),
                    Err(e) => {
                        tracing::debug!("pty read error: {e}");
                        break;
                    }
                }
            }
            sink.on_exit(wait_for_exit(&child));
        })
        .map_err(|e| SessionError::SpawnFailed(format!("failed to spawn reader thread: {e}")))?;
    Ok(())
}

/// Poll for the exit status after EOF.
///
/// Locks the child only per poll so a concurrent `kill` never blocks on
/// this thread.
fn wait_for_exit(child: &SharedChild) -> ExitRecord {
    let deadline = Instant::now() + EXIT_WAIT_GRACE;
    loop {
        match child.lock().try_wait() {
            Ok(Some(status)) => {
                return ExitRecord {
                    code: status.exit_code() as i32,
                    signal: None,
                }
            }
            Ok(None) => {
                if Instant::now() >= deadline {
                    tracing::debug!("child still running after PTY EOF, giving up on status");
                    let _ = child.lock().kill();
                    return ExitRecord {
                        code: UNKNOWN_EXIT_CODE,
                        signal: None,
                    };
                }
            }
            Err(e) => {
                tracing::debug!("pty wait failed: {e}");
                return ExitRecord {
                    code: UNKNOWN_EXIT_CODE,
                    signal: None,
                };
            }
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    }
}

/// One live native PTY child.
struct NativePtyChannel {
    master: Box<dyn MasterPty + Send>,
    writer: Box<dyn Write + Send>,
    child: SharedChild,
}

impl PtyChannel for NativePtyChannel {
    fn write(&mut self, data: &[u8]) -> Result<(), SessionError> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), SessionError> {
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| SessionError::SpawnFailed(format!("resize failed: {e}")))
    }

    fn kill(&mut self) {
        if let Err(e) = self.child.lock().kill() {
            tracing::debug!("pty kill error (may already be dead): {e}");
        }
    }
}

impl Drop for NativePtyChannel {
    fn drop(&mut self) {
        // Kill the child so the PTY fd closes and the reader thread exits
        // naturally. The process may have already exited.
        let _ = self.child.lock().kill();
    }
}

// =============================================================================
// TESTS
// =============================================================================
