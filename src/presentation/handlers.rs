// HTTP request handlers
use crate::infrastructure::wire::GraphData;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CARD_TYPE: &str = "stagg-heat-chart";
pub const CARD_NAME: &str = "Stagg Heating Graph";
/// Height of the card in the host frontend's display size units.
pub const CARD_SIZE: u32 = 3;

#[derive(Deserialize)]
pub struct GraphQuery {
    pub entry_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SwitchQuery {
    pub on: bool,
}

/// How the card registers itself with the host frontend.
#[derive(Serialize)]
pub struct CardDescriptor {
    #[serde(rename = "type")]
    pub card_type: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub card_size: u32,
}

/// Device state as last reported by the kettle's CLI.
#[derive(Serialize)]
pub struct KettleStateView {
    pub mode: Option<String>,
    pub current_temp: Option<f64>,
    pub target_temp: Option<f64>,
    pub units: Option<String>,
    pub lifted: bool,
    pub power: Option<bool>,
}

#[derive(Serialize)]
pub struct CardStatus {
    pub title: Option<String>,
    pub indicator: Option<String>,
    pub notice: Option<String>,
    pub has_chart: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Poll endpoint: the latest snapshot for one kettle. Absent data (no
/// collector, unknown target, switch off) is a 404, which pollers read as
/// "no data yet".
pub async fn graph_data(
    Query(query): Query<GraphQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<GraphData>, StatusCode> {
    let Some(collector) = &state.collector else {
        return Err(StatusCode::NOT_FOUND);
    };

    let entry_id = query.entry_id.unwrap_or_default();
    match collector.snapshot_for(&entry_id) {
        Some(snapshot) => Ok(Json(GraphData::from_snapshot(&snapshot))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// The card's registration descriptor
pub async fn card_descriptor() -> Json<CardDescriptor> {
    Json(CardDescriptor {
        card_type: CARD_TYPE,
        name: CARD_NAME,
        version: env!("CARGO_PKG_VERSION"),
        card_size: CARD_SIZE,
    })
}

/// What the card is currently showing
pub async fn card_status(State(state): State<Arc<AppState>>) -> Json<CardStatus> {
    let frame = state.frames.frame().await;
    let status = match frame.card {
        Some(card) => CardStatus {
            title: Some(card.title),
            indicator: card.indicator,
            notice: card.notice,
            has_chart: card.chart.is_some(),
        },
        None => CardStatus {
            title: None,
            indicator: None,
            notice: None,
            has_chart: false,
        },
    };
    Json(status)
}

/// Latest rendered frame
pub async fn chart_png(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.frames.frame().await;
    match frame.png {
        Some(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// The Live Heating Graph switch
pub async fn graph_switch(
    Query(query): Query<SwitchQuery>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    match &state.collector {
        Some(collector) => {
            collector.set_enabled(query.on);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Current device state, straight from the kettle's CLI
pub async fn kettle_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KettleStateView>, StatusCode> {
    let Some(collector) = &state.collector else {
        return Err(StatusCode::NOT_FOUND);
    };

    match collector.kettle_state().await {
        Ok(state) => Ok(Json(KettleStateView {
            mode: state.mode,
            current_temp: state.current_temp,
            target_temp: state.target_temp,
            units: state.units,
            lifted: state.lifted,
            power: state.power,
        })),
        Err(e) => {
            eprintln!("Error fetching kettle state: {}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// Heat on/off, forwarded to the kettle
pub async fn set_power(
    Query(query): Query<SwitchQuery>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    let Some(collector) = &state.collector else {
        return StatusCode::NOT_FOUND;
    };

    match collector.set_power(query.on).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            eprintln!("Error sending power command: {}", e);
            StatusCode::BAD_GATEWAY
        }
    }
}
