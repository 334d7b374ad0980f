//! Per-swap task scheduling

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Owns the orchestration task of every scheduled swap.
///
/// At most one task exists per quote id. Handles of finished tasks are
/// reaped lazily whenever a new task is scheduled.
#[derive(Debug, Clone, Default)]
pub struct SwapScheduler {
    tasks: Arc<DashMap<String, JoinHandle<()>>>,
}

impl SwapScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` for `quote_id`. Returns false, without spawning, if a
    /// task for that id is still tracked.
    pub fn schedule<F>(&self, quote_id: &str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.reap_finished();

        match self.tasks.entry(quote_id.to_string()) {
            Entry::Occupied(_) => {
                warn!("Swap {} already has an orchestration task", quote_id);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(tokio::spawn(task));
                debug!("Scheduled orchestration for swap {}", quote_id);
                true
            }
        }
    }

    /// Wait for the task of `quote_id` to finish. Returns false if no task
    /// was tracked for it.
    pub async fn wait(&self, quote_id: &str) -> bool {
        let Some((_, handle)) = self.tasks.remove(quote_id) else {
            return false;
        };

        if let Err(e) = handle.await {
            if e.is_panic() {
                error!("Orchestration task for swap {} panicked", quote_id);
            }
        }
        true
    }

    /// Wait for every tracked task
    pub async fn wait_all(&self) {
        let ids: Vec<String> = self.tasks.iter().map(|e| e.key().clone()).collect();
        let handles: Vec<_> = ids
            .iter()
            .filter_map(|id| self.tasks.remove(id).map(|(_, h)| h))
            .collect();

        futures::future::join_all(handles).await;
    }

    /// Abort the task of `quote_id`, leaving its record wherever it stopped
    pub fn cancel(&self, quote_id: &str) -> bool {
        match self.tasks.remove(quote_id) {
            Some((_, handle)) => {
                handle.abort();
                warn!("Cancelled orchestration for swap {}", quote_id);
                true
            }
            None => false,
        }
    }

    /// Number of tasks still running
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|e| !e.value().is_finished()).count()
    }

    fn reap_finished(&self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}
