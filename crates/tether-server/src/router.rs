use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tether_protocol::endpoints;

use crate::handler::{self, AppState};

/// Build the axum router with all Tether endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::STATES, get(handler::list_states_handler))
        .route(endpoints::UPDATE_STATE, post(handler::update_state_handler))
        .route(endpoints::EMIT_STATE, post(handler::emit_state_handler))
        .route(endpoints::STATE_EVENTS, get(handler::state_events_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
