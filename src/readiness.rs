// Readiness gate between the aggregation pipeline and the HTTP layer.
// The listener binds immediately; data routes answer 503 until the snapshot is published.
// A published snapshot is valid for its calendar day only and is recomputed on first use after.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::models::Snapshot;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone)]
pub enum Readiness {
    Pending,
    Ready(Arc<Snapshot>),
    Failed(String),
}

impl Readiness {
    pub fn label(&self) -> &'static str {
        match self {
            Readiness::Pending => "pending",
            Readiness::Ready(_) => "ready",
            Readiness::Failed(_) => "failed",
        }
    }
}

#[derive(Clone)]
pub struct SnapshotGate {
    inner: Arc<RwLock<Readiness>>,
    // Serializes day rollovers so concurrent requests trigger one recompute.
    rollover: Arc<Mutex<()>>,
}

impl Default for SnapshotGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::with_state(Readiness::Pending)
    }

    pub fn ready(snapshot: Snapshot) -> Self {
        Self::with_state(Readiness::Ready(Arc::new(snapshot)))
    }

    fn with_state(state: Readiness) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
            rollover: Arc::new(Mutex::new(())),
        }
    }

    pub async fn current(&self) -> Readiness {
        self.inner.read().await.clone()
    }

    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        match &*self.inner.read().await {
            Readiness::Ready(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub async fn publish(&self, snapshot: Snapshot) {
        *self.inner.write().await = Readiness::Ready(Arc::new(snapshot));
    }

    pub async fn fail(&self, reason: impl Into<String>) {
        *self.inner.write().await = Readiness::Failed(reason.into());
    }

    /// Current state, first replacing a ready snapshot from an earlier day with a fresh run.
    /// On failure the previous snapshot keeps being served.
    pub async fn current_for_today(&self, pipeline: &Pipeline) -> Readiness {
        let current = self.current().await;
        if !is_stale(&current, pipeline) {
            return current;
        }

        let _guard = self.rollover.lock().await;
        // Another request may have rolled over while we waited.
        let current = self.current().await;
        if !is_stale(&current, pipeline) {
            return current;
        }
        match pipeline.compute_snapshot().await {
            Ok(snapshot) => {
                tracing::info!(day = %pipeline.today(), "snapshot rolled over");
                let fresh = Arc::new(snapshot);
                *self.inner.write().await = Readiness::Ready(fresh.clone());
                Readiness::Ready(fresh)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "rollover",
                    "recompute failed; serving previous snapshot"
                );
                current
            }
        }
    }
}

fn is_stale(readiness: &Readiness, pipeline: &Pipeline) -> bool {
    match readiness {
        Readiness::Ready(s) => s.generated_at.date_naive() != pipeline.today(),
        _ => false,
    }
}

/// Runs the pipeline once in the background and publishes the outcome. No retry on failure.
/// A run that panics marks the gate failed.
pub fn spawn_initial_run(
    pipeline: Arc<Pipeline>,
    gate: SnapshotGate,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let run = tokio::spawn(async move { pipeline.compute_snapshot().await });
        match run.await {
            Ok(Ok(snapshot)) => {
                gate.publish(snapshot).await;
                tracing::info!("Server ready");
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, operation = "initial_aggregation", "aggregation failed; serving 503");
                gate.fail(e.to_string()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "initial_aggregation", "aggregation task aborted; serving 503");
                gate.fail(format!("aggregation task aborted: {}", e)).await;
            }
        }
    })
}
