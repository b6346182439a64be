/// HTTP endpoint paths for the Tether protocol.
pub mod endpoints {
    pub const HEALTH: &str = "/v1/health";
    pub const STATES: &str = "/v1/states";
    pub const UPDATE_STATE: &str = "/v1/state/update";
    pub const EMIT_STATE: &str = "/v1/state/emit";
    /// Route pattern for the notification stream of one state.
    pub const STATE_EVENTS: &str = "/v1/state/:name/events";

    /// Concrete notification stream path for `name`.
    pub fn state_events(name: &str) -> String {
        format!("/v1/state/{name}/events")
    }
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub protocol_version: u32,
    pub states: usize,
}

impl HealthResponse {
    pub fn with_states(states: usize) -> Self {
        Self {
            states,
            ..Self::default()
        }
    }
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            protocol_version: super::message::PROTOCOL_VERSION,
            states: 0,
        }
    }
}
