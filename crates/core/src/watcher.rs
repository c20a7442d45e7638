//! Incremental updates from file-system events
//!
//! Events are queued and applied strictly one at a time: the watcher moves
//! idle → applying → idle per event, and an event arriving mid-apply waits
//! in the queue instead of being dropped. Each apply re-indexes exactly one
//! file, patches the store, re-runs the analyzers, and invalidates the
//! query cache.

use anyhow::Result;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::engine::GraphEngine;

/// A single file-system change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
}

impl FileEvent {
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Removed(p) => p,
        }
    }
}

/// Applies file events to a [`GraphEngine`] without a full rebuild.
pub struct IncrementalWatcher {
    queue: Mutex<VecDeque<FileEvent>>,
    /// Held for the duration of each apply; serializes drains
    apply_guard: Mutex<()>,
}

impl IncrementalWatcher {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            apply_guard: Mutex::new(()),
        }
    }

    /// Enqueue an event. Always accepted, never dropped.
    pub fn submit(&self, event: FileEvent) {
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(event);
    }

    /// Number of events waiting to be applied.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Apply every queued event in arrival order. Returns the number
    /// applied. Concurrent callers serialize on the apply guard, so two
    /// drains can never interleave partial states.
    pub fn drain(&self, engine: &GraphEngine) -> Result<usize> {
        let _guard = self.apply_guard.lock().unwrap_or_else(|e| e.into_inner());
        let mut applied = 0usize;

        loop {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front();
            let Some(event) = next else {
                break;
            };

            log::debug!("applying {:?}", event);
            engine.apply_event(&event)?;
            applied += 1;
        }

        Ok(applied)
    }
}

impl Default for IncrementalWatcher {
    fn default() -> Self {
        Self::new()
    }
}
