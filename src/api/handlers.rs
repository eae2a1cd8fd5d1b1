//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        Json,
    },
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, error, info};

use crate::{
    state::{AppState, Intent, TOTAL_DURATION},
    view::Display,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

/// SSE event name sent when a client missed events
pub const LAGGED_EVENT: &str = "lagged";

/// Handle POST /message - Forward an intent to the controller
pub async fn message_handler(
    State(state): State<Arc<AppState>>,
    Json(intent): Json<Intent>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let name = intent.name();
    match state.send_intent(intent) {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse::accepted(
                format!("{} forwarded", name),
                state.snapshot(),
            )),
        )),
        Err(e) => {
            error!("Failed to forward {}: {}", name, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /alarms/:name - Fire a named alarm
pub async fn alarm_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    match state.fire_alarm(&name) {
        Ok(()) => Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse::accepted(
                format!("Alarm {} delivered", name),
                state.snapshot(),
            )),
        )),
        Err(e) => {
            error!("Failed to deliver alarm {}: {}", name, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - Return the persisted timer state
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        state: timer,
        total_duration: TOTAL_DURATION,
        display: Display::render(timer.time_left, TOTAL_DURATION, timer.completed_cycles),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream controller events as server-sent events
///
/// A client that falls behind receives a `lagged` event carrying the number of
/// missed events and should re-fetch `/status`.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    info!("View attached to event stream");
    let stream = BroadcastStream::new(state.controller.subscribe()).filter_map(|event| async move {
        match event {
            Ok(event) => SseEvent::default().json_data(&event).ok().map(Ok::<_, Infallible>),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                debug!("Event stream lagged, {} events missed", missed);
                Some(Ok(SseEvent::default()
                    .event(LAGGED_EVENT)
                    .data(missed.to_string())))
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
