// Telemetry poller - keeps the rendered card in sync with the data source
use crate::application::card_presenter::CardPresenter;
use crate::application::card_service::CardService;
use crate::application::snapshot_repository::SnapshotRepository;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct TelemetryPoller {
    repository: Arc<dyn SnapshotRepository>,
    cards: CardService,
    presenter: Arc<dyn CardPresenter>,
    entry_id: String,
    interval: Duration,
    running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

impl TelemetryPoller {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        cards: CardService,
        presenter: Arc<dyn CardPresenter>,
        entry_id: String,
        interval: Duration,
    ) -> Self {
        Self {
            repository,
            cards,
            presenter,
            entry_id,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
        }
    }

    /// Begin polling. The first fetch happens immediately; each later cycle
    /// is scheduled only after the previous fetch-and-render completes, so
    /// cycles never overlap and a slow response throttles the rate.
    pub fn start(&self) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);

        let repository = self.repository.clone();
        let cards = self.cards.clone();
        let presenter = self.presenter.clone();
        let entry_id = self.entry_id.clone();
        let interval = self.interval;
        let running = self.running.clone();
        let stop_signal = self.stop_signal.clone();

        tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                let snapshot = match repository.fetch_snapshot(&entry_id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        tracing::warn!("snapshot fetch failed for {}: {}", entry_id, e);
                        None
                    }
                };

                // A stop while the fetch was in flight discards its result.
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let card = cards.build_card(snapshot.as_ref());
                if let Err(e) = presenter.present(&card).await {
                    tracing::warn!("card render failed: {}", e);
                }

                tokio::select! {
                    _ = stop_signal.notified() => {}
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::debug!("poller for {} stopped", entry_id);
        })
    }

    /// Stop polling. No fetch begins after this returns; a fetch already in
    /// flight finishes but its result is dropped. Safe to call repeatedly.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.stop_signal.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Card;
    use crate::domain::kettle::Kettle;
    use crate::domain::telemetry::{Sample, Snapshot};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingRepository {
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl SnapshotRepository for CountingRepository {
        async fn fetch_snapshot(&self, _entry_id: &str) -> anyhow::Result<Option<Snapshot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(Some(Snapshot::new(
                false,
                vec![Sample::new("10:00".into(), Some(40.0), Some(40.0), Some(0.0))],
            )))
        }
    }

    #[derive(Default)]
    struct RecordingPresenter {
        cards: Mutex<Vec<Card>>,
    }

    #[async_trait]
    impl CardPresenter for RecordingPresenter {
        async fn present(&self, card: &Card) -> anyhow::Result<()> {
            self.cards.lock().unwrap().push(card.clone());
            Ok(())
        }
    }

    fn make_poller(
        repository: Arc<CountingRepository>,
        presenter: Arc<RecordingPresenter>,
    ) -> TelemetryPoller {
        TelemetryPoller::new(
            repository,
            CardService::new(Kettle::new("stagg".into()), None),
            presenter,
            "stagg".into(),
            Duration::from_millis(1000),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let repository = Arc::new(CountingRepository::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let poller = make_poller(repository.clone(), presenter.clone());

        let _ = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
        assert_eq!(presenter.cards.lock().unwrap().len(), 1);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_are_interval_spaced() {
        let repository = Arc::new(CountingRepository::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let poller = make_poller(repository.clone(), presenter.clone());

        let _ = poller.start();
        // First cycle at t=0, then one more per elapsed interval.
        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(repository.calls.load(Ordering::SeqCst), 4);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_halts_fetching() {
        let repository = Arc::new(CountingRepository::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let poller = make_poller(repository.clone(), presenter.clone());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;

        poller.stop();
        poller.stop();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_unstarted_poller_is_safe() {
        let repository = Arc::new(CountingRepository::default());
        let presenter = Arc::new(RecordingPresenter::default());
        let poller = make_poller(repository.clone(), presenter.clone());

        poller.stop();
        poller.stop();
        assert_eq!(repository.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_is_discarded_after_stop() {
        let gate = Arc::new(Notify::new());
        let repository = Arc::new(CountingRepository {
            calls: AtomicUsize::new(0),
            gate: Some(gate.clone()),
        });
        let presenter = Arc::new(RecordingPresenter::default());
        let poller = make_poller(repository.clone(), presenter.clone());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(repository.calls.load(Ordering::SeqCst), 1);

        // Stop while the fetch is still in flight, then let it return.
        poller.stop();
        gate.notify_waiters();
        handle.await.unwrap();

        assert!(presenter.cards.lock().unwrap().is_empty());
    }
}
