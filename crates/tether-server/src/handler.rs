use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use tether_protocol::{
    encode_notification, EmitStateRequest, EmitStateResponse, HealthResponse, ListStatesResponse,
    StateInfo, UpdateStateResponse,
};
use tether_sync::SyncEngine;
use tether_types::{StateName, StateUpdate};

use crate::error::{ServerError, ServerResult};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
    pub keep_alive: Duration,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::with_states(state.engine.registry().len()))
}

pub async fn list_states_handler(State(state): State<AppState>) -> Json<ListStatesResponse> {
    let states = state
        .engine
        .registry()
        .list()
        .await
        .into_iter()
        .map(|info| StateInfo {
            name: info.name,
            version: info.version,
            type_name: info.type_name,
            updated_at: info.updated_at,
        })
        .collect();
    Json(ListStatesResponse { states })
}

/// Decode a command body.
///
/// A string `name` field is validated on its own first so that a bad name is
/// reported as `invalid_name` rather than as a shapeless body error.
fn command_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<T> {
    let Json(body) = payload?;
    if let Some(name) = body.get("name").and_then(Value::as_str) {
        StateName::new(name)?;
    }
    serde_json::from_value(body).map_err(|e| ServerError::Body(e.to_string()))
}

pub async fn update_state_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<UpdateStateResponse>> {
    let update: StateUpdate = command_body(payload)?;
    let version = state.engine.update_state(update).await?;
    Ok(Json(UpdateStateResponse { version }))
}

pub async fn emit_state_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<EmitStateResponse>> {
    let request: EmitStateRequest = command_body(payload)?;
    let emitted = state.engine.emit_state(request.name.as_str()).await?;
    Ok(Json(EmitStateResponse { emitted }))
}

/// Server-sent `<name>_update` notifications for one state.
///
/// The subscription is registered before the response is returned, so a
/// client that calls `emit_state` after the stream opens sees the result.
pub async fn state_events_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let mut subscription = state.engine.subscribe(&name)?;
    debug!(name = %name, id = %subscription.id(), "notification stream opened");

    let events = async_stream::stream! {
        while let Some(event) = subscription.next().await {
            match encode_notification(&event) {
                Ok((event_name, data)) => yield Ok(Event::default().event(event_name).data(data)),
                Err(e) => warn!(name = %event.name, error = %e, "dropping notification"),
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive)))
}
