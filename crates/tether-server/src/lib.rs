//! HTTP server for Tether.
//!
//! Exposes the `update_state` and `emit_state` commands as JSON endpoints,
//! streams `<name>_update` notifications as server-sent events, and seeds
//! states from the configuration file at startup.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StateSeed, TetherConfig};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::TetherServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use tether_protocol::{decode_notification, endpoints};
    use tether_sync::SyncEngine;
    use tether_types::ErrorKind;

    use super::*;

    fn app(engine: &Arc<SyncEngine>) -> Router {
        router::build_router(AppState {
            engine: Arc::clone(engine),
            keep_alive: Duration::from_secs(15),
        })
    }

    fn seeded() -> Arc<SyncEngine> {
        let engine = Arc::new(SyncEngine::default());
        engine.registry().insert("counter", json!({ "n": 0 })).unwrap();
        engine
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ---- Health / listing ----

    #[tokio::test]
    async fn health_endpoint() {
        let response = app(&seeded()).oneshot(get(endpoints::HEALTH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["states"], 1);
    }

    #[tokio::test]
    async fn list_states_endpoint() {
        let response = app(&seeded()).oneshot(get(endpoints::STATES)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["states"][0]["name"], "counter");
        assert_eq!(body["states"][0]["version"], 0);
    }

    // ---- update_state ----

    #[tokio::test]
    async fn update_accepted() {
        let engine = seeded();
        let response = app(&engine)
            .oneshot(post(
                endpoints::UPDATE_STATE,
                json!({ "version": 0, "name": "counter", "value": { "n": 1 } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "version": 1 }));

        let snapshot = engine.registry().snapshot("counter").await.unwrap().unwrap();
        assert_eq!(snapshot.value, json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn stale_update_is_conflict() {
        let engine = seeded();
        let first = json!({ "version": null, "name": "counter", "value": 5 });
        engine
            .update_state(serde_json::from_value(first).unwrap())
            .await
            .unwrap();

        let response = app(&engine)
            .oneshot(post(
                endpoints::UPDATE_STATE,
                json!({ "version": 0, "name": "counter", "value": 6 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["kind"], ErrorKind::Stale.as_str());
    }

    #[tokio::test]
    async fn update_for_unknown_state_is_not_found() {
        let response = app(&seeded())
            .oneshot(post(
                endpoints::UPDATE_STATE,
                json!({ "version": null, "name": "missing", "value": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "unknown_state");
    }

    #[tokio::test]
    async fn update_with_wrong_shape_is_unprocessable() {
        let engine = Arc::new(SyncEngine::default());
        engine.registry().insert("count", 3u32).unwrap();

        let response = app(&engine)
            .oneshot(post(
                endpoints::UPDATE_STATE,
                json!({ "version": 0, "name": "count", "value": "three" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["kind"], "type_mismatch");
    }

    #[tokio::test]
    async fn update_with_invalid_name_is_bad_request() {
        let response = app(&seeded())
            .oneshot(post(
                endpoints::UPDATE_STATE,
                json!({ "version": 0, "name": "a b", "value": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "invalid_name");
    }

    #[tokio::test]
    async fn update_missing_value_is_json_error() {
        let response = app(&seeded())
            .oneshot(post(endpoints::UPDATE_STATE, json!({ "name": "counter" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "type_mismatch");
        assert!(body["message"].as_str().unwrap().contains("value"));
    }

    #[tokio::test]
    async fn update_with_unparseable_body_is_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri(endpoints::UPDATE_STATE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app(&seeded()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "type_mismatch");
    }

    // ---- emit_state ----

    #[tokio::test]
    async fn emit_reports_whether_state_exists() {
        let engine = seeded();

        let response = app(&engine)
            .oneshot(post(endpoints::EMIT_STATE, json!({ "name": "counter" })))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({ "emitted": true }));

        let response = app(&engine)
            .oneshot(post(endpoints::EMIT_STATE, json!({ "name": "missing" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "emitted": false }));
    }

    #[tokio::test]
    async fn emit_with_empty_name_is_bad_request() {
        let response = app(&seeded())
            .oneshot(post(endpoints::EMIT_STATE, json!({ "name": "" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "invalid_name");
    }

    #[tokio::test]
    async fn emit_without_json_content_type_is_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri(endpoints::EMIT_STATE)
            .body(Body::from(r#"{"name":"counter"}"#))
            .unwrap();
        let response = app(&seeded()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_json(response).await["kind"], "type_mismatch");
    }

    // ---- Notification stream ----

    #[tokio::test]
    async fn events_stream_carries_named_notifications() {
        let engine = seeded();
        let response = app(&engine)
            .oneshot(get(&endpoints::state_events("counter")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(engine.subscriber_count("counter"), 1);

        assert!(engine.emit_state("counter").await.unwrap());

        let mut body = response.into_body().into_data_stream();
        let frame = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let frame = String::from_utf8(frame.to_vec()).unwrap();

        let field = |prefix: &str| {
            frame
                .lines()
                .find_map(|line| line.strip_prefix(prefix))
                .map(str::trim_start)
                .unwrap()
                .to_string()
        };
        let event = decode_notification(&field("event:"), &field("data:")).unwrap();
        assert_eq!(event.name.as_str(), "counter");
        assert_eq!(event.version.get(), 0);
        assert_eq!(event.value, json!({ "n": 0 }));
    }

    #[tokio::test]
    async fn events_stream_rejects_invalid_name() {
        let response = app(&seeded())
            .oneshot(get("/v1/state/bad%20name/events"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn closed_streams_release_their_channels() {
        let engine = seeded();
        for i in 0..50 {
            let response = app(&engine)
                .oneshot(get(&endpoints::state_events(&format!("ghost{i}"))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            drop(response);
        }
        assert_eq!(engine.broadcaster().channel_count(), 0);
    }
}
