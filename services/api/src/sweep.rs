//! services/api/src/sweep.rs
//!
//! The recurring eviction sweep. Sessions past the retention window are
//! deleted by the store; this module owns the timer so the process lifecycle
//! can start and stop it explicitly, and tests can trigger eviction on demand
//! through the store instead of waiting on wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use resume_coach_core::ports::SessionStore;

/// Handle to the background eviction task.
pub struct EvictionSweeper {
    handle: JoinHandle<()>,
    token: CancellationToken,
}

impl EvictionSweeper {
    /// Spawns the sweep loop, evicting once per `period` until stopped.
    pub fn start(store: Arc<dyn SessionStore>, period: Duration) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; main already swept at startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        info!("eviction sweeper stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match store.evict_expired().await {
                            Ok(0) => {}
                            Ok(removed) => info!(removed, "evicted expired sessions"),
                            Err(e) => warn!(error = %e, "eviction sweep failed"),
                        }
                    }
                }
            }
        });

        Self { handle, token }
    }

    /// Cancels the sweep loop and waits for the task to finish.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "eviction sweeper task did not shut down cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    use resume_coach_core::domain::{AnalysisRecord, ChatMessage, ResumeSession};
    use resume_coach_core::ports::{PortError, PortResult};

    /// Counts eviction calls; every other operation is unreachable in these tests.
    struct CountingStore {
        evictions: AtomicU64,
    }

    #[async_trait]
    impl SessionStore for CountingStore {
        async fn create_session(
            &self,
            _text: &str,
            _analysis: &AnalysisRecord,
            _file_name: &str,
        ) -> PortResult<Uuid> {
            Err(PortError::Unexpected("not used".to_string()))
        }

        async fn get_session(&self, _id: Uuid) -> PortResult<Option<ResumeSession>> {
            Ok(None)
        }

        async fn append_chat_message(&self, _message: &ChatMessage) -> PortResult<()> {
            Ok(())
        }

        async fn list_chat_messages(&self, _session_id: Uuid) -> PortResult<Vec<ChatMessage>> {
            Ok(Vec::new())
        }

        async fn evict_expired(&self) -> PortResult<u64> {
            self.evictions.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[tokio::test]
    async fn sweeper_evicts_on_each_tick_and_stops_on_cancel() {
        let store = Arc::new(CountingStore {
            evictions: AtomicU64::new(0),
        });

        let sweeper = EvictionSweeper::start(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(55)).await;
        sweeper.stop().await;

        let swept = store.evictions.load(Ordering::SeqCst);
        assert!(swept >= 2, "expected at least two sweeps, got {swept}");

        // No further sweeps after stop.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.evictions.load(Ordering::SeqCst), swept);
    }
}
