// Live-graph collector - samples the kettle's PID loop into a bounded buffer
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::telemetry::{Sample, Snapshot};
use crate::infrastructure::kettle_cli::{CliError, KettleCliClient, KettleState, PwmReport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Retention of the live buffer; older samples fall off the front.
const MAX_SAMPLES: usize = 300;

/// The kettle counts as stable when this many consecutive samples sit within
/// tolerance of the target.
const STABLE_WINDOW: usize = 5;
const STABLE_TOLERANCE_C: f64 = 1.0;

pub struct CollectorService {
    entry_id: String,
    cli: KettleCliClient,
    enabled: AtomicBool,
    buffer: Mutex<VecDeque<Sample>>,
}

impl CollectorService {
    pub fn new(entry_id: String, cli: KettleCliClient) -> Self {
        Self {
            entry_id,
            cli,
            enabled: AtomicBool::new(false),
            buffer: Mutex::new(VecDeque::new()),
        }
    }

    /// The Live Heating Graph switch. Turning it off keeps the buffer;
    /// retention alone trims it.
    pub fn set_enabled(&self, on: bool) {
        self.enabled.store(on, Ordering::SeqCst);
        tracing::info!(
            "live graph collection for {} turned {}",
            self.entry_id,
            if on { "on" } else { "off" }
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// One collection cycle: query the PID loop and append a sample. CLI
    /// failures are logged and skipped; the tick cadence is the retry policy.
    pub async fn tick(&self) {
        if !self.is_enabled() {
            return;
        }
        match self.cli.pwmprt().await {
            Ok(report) => {
                tracing::debug!(
                    "pwm tempr={:?} setp={:?} out={:?} err={:?} integral={:?} cnt={:?}",
                    report.tempr,
                    report.setp,
                    report.out,
                    report.err,
                    report.integral,
                    report.cnt
                );
                let label = chrono::Local::now().format("%H:%M:%S").to_string();
                self.record(label, &report);
            }
            Err(e) => tracing::warn!("pwmprt poll failed for {}: {}", self.entry_id, e),
        }
    }

    pub fn record(&self, label: String, report: &PwmReport) {
        let sample = Sample::new(label, report.tempr, report.setp, report.out);
        let mut buffer = self.buffer.lock().unwrap();
        buffer.push_back(sample);
        while buffer.len() > MAX_SAMPLES {
            buffer.pop_front();
        }
    }

    /// The snapshot served to pollers, or None when this collector does not
    /// own the requested target or collection is off.
    pub fn snapshot_for(&self, entry_id: &str) -> Option<Snapshot> {
        if entry_id != self.entry_id {
            tracing::debug!("no collector for target {}", entry_id);
            return None;
        }
        if !self.is_enabled() {
            return None;
        }
        let samples: Vec<Sample> = self.buffer.lock().unwrap().iter().cloned().collect();
        let stable = is_stable(&samples);
        Some(Snapshot::new(stable, samples))
    }

    pub async fn set_power(&self, on: bool) -> Result<(), CliError> {
        self.cli.set_power(on).await
    }

    pub async fn kettle_state(&self) -> Result<KettleState, CliError> {
        self.cli.state().await
    }

    /// Run the collection loop. Ticks are strictly sequential within the
    /// task, so a slow kettle response just stretches the cycle.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }
}

fn is_stable(samples: &[Sample]) -> bool {
    if samples.len() < STABLE_WINDOW {
        return false;
    }
    samples[samples.len() - STABLE_WINDOW..]
        .iter()
        .all(|s| match (s.current, s.target) {
            (Some(current), Some(target)) => (current - target).abs() <= STABLE_TOLERANCE_C,
            _ => false,
        })
}

/// Serves this process's own collector through the snapshot seam, so the
/// card poller does not care whether its source is local or remote.
pub struct LocalSnapshotRepository {
    collector: Arc<CollectorService>,
}

impl LocalSnapshotRepository {
    pub fn new(collector: Arc<CollectorService>) -> Self {
        Self { collector }
    }
}

#[async_trait]
impl SnapshotRepository for LocalSnapshotRepository {
    async fn fetch_snapshot(&self, entry_id: &str) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.collector.snapshot_for(entry_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_collector() -> CollectorService {
        let cli = KettleCliClient::new("http://kettle.local", "/cli").unwrap();
        CollectorService::new("stagg".to_string(), cli)
    }

    fn report(tempr: f64, setp: f64) -> PwmReport {
        PwmReport {
            tempr: Some(tempr),
            setp: Some(setp),
            out: Some(50.0),
            ..PwmReport::default()
        }
    }

    #[test]
    fn test_snapshot_requires_matching_target_and_switch() {
        let collector = make_collector();
        collector.record("10:00:00".into(), &report(40.0, 40.0));

        assert!(collector.snapshot_for("stagg").is_none());

        collector.set_enabled(true);
        assert!(collector.snapshot_for("other").is_none());

        let snapshot = collector.snapshot_for("stagg").unwrap();
        assert_eq!(snapshot.samples.len(), 1);
    }

    #[test]
    fn test_stability_needs_full_window_within_tolerance() {
        let collector = make_collector();
        collector.set_enabled(true);

        for _ in 0..4 {
            collector.record("t".into(), &report(39.5, 40.0));
        }
        assert!(!collector.snapshot_for("stagg").unwrap().stable);

        collector.record("t".into(), &report(40.4, 40.0));
        assert!(collector.snapshot_for("stagg").unwrap().stable);

        // One excursion resets the verdict.
        collector.record("t".into(), &report(44.0, 40.0));
        assert!(!collector.snapshot_for("stagg").unwrap().stable);
    }

    #[test]
    fn test_stability_requires_readings() {
        let collector = make_collector();
        collector.set_enabled(true);

        for _ in 0..5 {
            collector.record(
                "t".into(),
                &PwmReport {
                    tempr: Some(40.0),
                    setp: None,
                    ..PwmReport::default()
                },
            );
        }
        assert!(!collector.snapshot_for("stagg").unwrap().stable);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let collector = make_collector();
        collector.set_enabled(true);

        for i in 0..(MAX_SAMPLES + 25) {
            collector.record(format!("t{}", i), &report(40.0, 40.0));
        }

        let snapshot = collector.snapshot_for("stagg").unwrap();
        assert_eq!(snapshot.samples.len(), MAX_SAMPLES);
        assert_eq!(snapshot.samples[0].label, "t25");
    }
}
