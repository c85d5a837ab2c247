//! In-memory agent state store.

use revoice_feedback::FeedbackOutcome;
use revoice_types::{AgentSnapshot, AgentStatus};
use std::sync::RwLock;

#[derive(Debug)]
struct Inner {
    snapshot: AgentSnapshot,
    /// The number behind the current version label. The configured base
    /// prompt counts as version 1, so the first evolved prompt is v2.
    version_counter: u32,
}

/// Injectable store for the agent's process-lifetime state.
///
/// All state lives behind one lock with explicit accessors; nothing outside
/// this type mutates it. Lock acquisitions are brief field updates that
/// never span `.await` points, so a synchronous lock is safe here.
#[derive(Debug)]
pub struct AgentStore {
    inner: RwLock<Inner>,
}

impl Default for AgentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                snapshot: AgentSnapshot::default(),
                version_counter: 1,
            }),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> AgentSnapshot {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot
            .clone()
    }

    /// The version number the next completed feedback pass gets.
    pub fn next_version_number(&self) -> u32 {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .version_counter
            + 1
    }

    /// Marks a feedback pass as started. The stored prompt is cleared while
    /// processing; clients read it again once the pass completes.
    pub fn begin_processing(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.snapshot.status = AgentStatus::Processing;
        inner.snapshot.description = "Analyzing conversation and improving...".to_string();
        inner.snapshot.full_prompt = None;
    }

    /// Records a completed feedback pass.
    pub fn complete(&self, outcome: &FeedbackOutcome) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.version_counter += 1;
        inner.snapshot.status = AgentStatus::Ready;
        inner.snapshot.version = outcome.version_label.clone();
        inner.snapshot.description = outcome.description.clone();
        inner.snapshot.conversations_completed += 1;
        inner.snapshot.full_prompt = Some(outcome.full_prompt.clone());
    }

    /// Records a failed feedback pass.
    ///
    /// The prompt reverts to the caller-supplied text (not the last evolved
    /// prompt); the completed count and version label are unchanged.
    pub fn fail(&self, fallback_prompt: Option<String>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.snapshot.status = AgentStatus::Ready;
        inner.snapshot.description = "Processing failed, using previous version".to_string();
        inner.snapshot.full_prompt = fallback_prompt;
    }
}
