//! In-memory PTY backend for tests.
//!
//! Records every spawn, write, resize, and kill, and lets tests push data
//! and exit events through the sink captured at `open` time — including
//! after a kill, to model OS events still in flight from a dead session.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{EventSink, ExitRecord, PtyBackend, PtyChannel, PtySpawnSpec};
use crate::error::SessionError;

#[derive(Default)]
struct FakeState {
    spawns: Vec<PtySpawnSpec>,
    writes: Vec<Vec<u8>>,
    resizes: Vec<(u16, u16)>,
    kills: usize,
    sink: Option<Box<dyn EventSink>>,
    fail_open: Option<String>,
    fail_writes: bool,
    fail_resizes: bool,
}

/// Cloneable handle; all clones share one recording.
#[derive(Clone, Default)]
pub(crate) struct FakePtyBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakePtyBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Deliver a data chunk through the captured sink.
    pub(crate) fn push_data(&self, data: &[u8]) {
        let state = self.state.lock();
        if let Some(sink) = state.sink.as_ref() {
            sink.on_data(data);
        }
    }

    /// Deliver an exit record through the captured sink.
    pub(crate) fn push_exit(&self, exit: ExitRecord) {
        let state = self.state.lock();
        if let Some(sink) = state.sink.as_ref() {
            sink.on_exit(exit);
        }
    }

    pub(crate) fn last_spawn(&self) -> PtySpawnSpec {
        self.state
            .lock()
            .spawns
            .last()
            .expect("no spawn recorded")
            .clone()
    }

    pub(crate) fn spawn_count(&self) -> usize {
        self.state.lock().spawns.len()
    }

    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    pub(crate) fn resizes(&self) -> Vec<(u16, u16)> {
        self.state.lock().resizes.clone()
    }

    pub(crate) fn kills(&self) -> usize {
        self.state.lock().kills
    }

    pub(crate) fn fail_next_open(&self, message: &str) {
        self.state.lock().fail_open = Some(message.to_string());
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub(crate) fn fail_resizes(&self, fail: bool) {
        self.state.lock().fail_resizes = fail;
    }
}

impl PtyBackend for FakePtyBackend {
    fn open(
        &self,
        spec: PtySpawnSpec,
        sink: Box<dyn EventSink>,
    ) -> Result<Box<dyn PtyChannel>, SessionError> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_open.take() {
            return Err(SessionError::SpawnFailed(message));
        }
        state.spawns.push(spec);
        state.sink = Some(sink);
        Ok(Box::new(FakeChannel {
            state: self.state.clone(),
        }))
    }
}

struct FakeChannel {
    state: Arc<Mutex<FakeState>>,
}

impl PtyChannel for FakeChannel {
    fn write(&mut self, data: &[u8]) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(SessionError::SpawnFailed("write to dead pty".to_string()));
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.fail_resizes {
            return Err(SessionError::SpawnFailed("resize on dead pty".to_string()));
        }
        state.resizes.push((cols, rows));
        Ok(())
    }

    fn kill(&mut self) {
        // The sink is kept: the real backend's reader thread can still be
        // draining when kill lands, and tests reproduce that by pushing
        // events after kill.
        self.state.lock().kills += 1;
    }
}
