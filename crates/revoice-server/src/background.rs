//! Background feedback pass execution.
//!
//! One pass runs at a time: a trigger that arrives while a pass is in
//! flight is acknowledged but does not spawn a second task, so concurrent
//! triggers cannot race on the shared agent state. The in-flight pass can
//! be aborted at shutdown.

use crate::AppState;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Single-flight handle for the background feedback task.
#[derive(Debug, Default)]
pub struct FeedbackRunner {
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl FeedbackRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a feedback pass unless one is already running.
    ///
    /// Returns `true` when a new pass was spawned. The store transition to
    /// `processing` happens under the same lock as the spawn, so a snapshot
    /// taken after a successful trigger always observes it.
    pub fn trigger(&self, state: Arc<AppState>, current_prompt: Option<String>) -> bool {
        let mut guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                tracing::info!("feedback pass already in flight, not spawning another");
                return false;
            }
        }

        state.store.begin_processing();
        let task_state = state.clone();
        *guard = Some(tokio::spawn(async move {
            run_feedback_pass(task_state, current_prompt).await;
        }));
        true
    }

    /// Aborts the in-flight pass, if any. Used at shutdown.
    pub fn abort(&self) {
        let mut guard = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = guard.take() {
            if !handle.is_finished() {
                tracing::info!("aborting in-flight feedback pass");
                handle.abort();
            }
        }
    }
}

/// Runs one pass and folds the result into the store.
///
/// Failures never propagate: the store resets to ready with the
/// caller-supplied prompt as the fallback.
async fn run_feedback_pass(state: Arc<AppState>, current_prompt: Option<String>) {
    let next_version = state.store.next_version_number();

    match state.engine.process(current_prompt.clone(), next_version).await {
        Ok(outcome) => {
            tracing::info!(
                version = %outcome.version_label,
                conversation_id = %outcome.conversation_id,
                prompt_chars = outcome.full_prompt.chars().count(),
                "agent updated"
            );
            state.store.complete(&outcome);
        }
        Err(e) => {
            tracing::error!("feedback pass failed: {}", e);
            state.store.fail(current_prompt);
        }
    }
}
