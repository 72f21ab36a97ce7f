// Repository trait for snapshot retrieval
use crate::domain::telemetry::Snapshot;
use async_trait::async_trait;

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the latest snapshot for one target. Absence (collection turned
    /// off, unknown target, source unreachable) is Ok(None), not an error.
    async fn fetch_snapshot(&self, entry_id: &str) -> anyhow::Result<Option<Snapshot>>;
}
