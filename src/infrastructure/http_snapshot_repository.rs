// Poll-endpoint client for a remote snapshot source
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::telemetry::Snapshot;
use crate::infrastructure::wire::GraphData;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct HttpSnapshotRepository {
    base_url: String,
}

impl HttpSnapshotRepository {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_poll_url(&self, entry_id: &str) -> String {
        format!(
            "{}/graph_data?entry_id={}",
            self.base_url,
            urlencoding::encode(entry_id)
        )
    }
}

#[async_trait]
impl SnapshotRepository for HttpSnapshotRepository {
    /// Transport failures, non-2xx statuses and malformed bodies all read as
    /// "no data yet"; the caller's next cycle is the retry.
    async fn fetch_snapshot(&self, entry_id: &str) -> anyhow::Result<Option<Snapshot>> {
        let url = self.build_poll_url(entry_id);

        let client = reqwest::Client::new();
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("poll request failed: {}", e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::debug!("poll endpoint returned {}", response.status());
            return Ok(None);
        }

        match response.json::<GraphData>().await {
            Ok(data) => Ok(Some(data.into_snapshot())),
            Err(e) => {
                tracing::debug!("poll response malformed: {}", e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_poll_url() {
        let repository = HttpSnapshotRepository::new("http://127.0.0.1:8080/".to_string());
        assert_eq!(
            repository.build_poll_url("stagg ekg"),
            "http://127.0.0.1:8080/graph_data?entry_id=stagg%20ekg"
        );
    }
}
