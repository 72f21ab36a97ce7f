// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::card_presenter::CardPresenter;
use crate::application::card_service::CardService;
use crate::application::collector_service::{CollectorService, LocalSnapshotRepository};
use crate::application::poller_service::TelemetryPoller;
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::kettle::Kettle;
use crate::infrastructure::chart_png::ChartRenderer;
use crate::infrastructure::config::{load_card_config, load_kettle_config, resolve_target};
use crate::infrastructure::http_snapshot_repository::HttpSnapshotRepository;
use crate::infrastructure::kettle_cli::KettleCliClient;
use crate::presentation::app_state::AppState;
use crate::presentation::frame_store::{FrameStore, RenderingPresenter};
use crate::presentation::handlers::{
    card_descriptor, card_status, chart_png, graph_data, graph_switch, health_check, kettle_state,
    set_power,
};

const COLLECT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration; the collector half is optional
    let card_config = load_card_config()?;
    let kettle_config = match load_kettle_config() {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("no kettle config, collector disabled: {}", e);
            None
        }
    };

    let bind = kettle_config
        .as_ref()
        .map(|c| c.server.bind.clone())
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());
    let addr: SocketAddr = bind.parse()?;

    // Collector half: CLI client + sampling loop
    let collector = match &kettle_config {
        Some(config) => {
            let cli = KettleCliClient::new(&config.kettle.base_url, &config.kettle.cli_path)?;
            let collector = Arc::new(CollectorService::new(config.kettle.entry_id.clone(), cli));
            let _ = collector.clone().spawn(COLLECT_INTERVAL);
            Some(collector)
        }
        None => None,
    };

    // Frame pipeline shared by the poller and the HTTP surface
    let frames = Arc::new(FrameStore::new());
    let presenter: Arc<dyn CardPresenter> =
        Arc::new(RenderingPresenter::new(ChartRenderer::new(), frames.clone()));

    // Snapshot source for the card: explicit remote endpoint, else the
    // in-process collector, else this server's own poll endpoint
    let poll_url = card_config.card.poll_url.clone().filter(|u| !u.is_empty());
    let repository: Arc<dyn SnapshotRepository> = match (poll_url, &collector) {
        (Some(url), _) => Arc::new(HttpSnapshotRepository::new(url)),
        (None, Some(collector)) => Arc::new(LocalSnapshotRepository::new(collector.clone())),
        (None, None) => Arc::new(HttpSnapshotRepository::new(format!(
            "http://127.0.0.1:{}",
            addr.port()
        ))),
    };

    // Card poller; an unresolved target is shown once and polling never starts
    match resolve_target(&card_config.card, &card_config.registry) {
        Some(entry_id) => {
            let kettle = Kettle::new(entry_id);
            let cards = CardService::new(kettle.clone(), card_config.card.stable_text.clone());
            let poller = TelemetryPoller::new(
                repository,
                cards,
                presenter.clone(),
                kettle.id,
                Duration::from_millis(card_config.card.poll_interval_ms),
            );
            let _ = poller.start();
        }
        None => {
            let card = CardService::unconfigured_card("Kettle heating".to_string());
            if let Err(e) = presenter.present(&card).await {
                tracing::warn!("card render failed: {}", e);
                frames.set(card, None).await;
            }
        }
    }

    // Application state + router (presentation layer)
    let state = Arc::new(AppState { collector, frames });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/graph_data", get(graph_data))
        .route("/card", get(card_descriptor))
        .route("/status", get(card_status))
        .route("/chart.png", get(chart_png))
        .route("/graph_switch", post(graph_switch))
        .route("/power", post(set_power))
        .route("/kettle", get(kettle_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    println!("Starting kettle-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
