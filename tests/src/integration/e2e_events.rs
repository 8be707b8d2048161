//! # End-to-End Event Flow
//!
//! ```text
//! POST /events ──→ EventQueue ──drain tick──→ EventRouter ──→ satellite
//!                      │                           │
//!                      ▼                           ▼
//!               queue.ndjson               receipts/<id>.json
//!                      └──────────┬────────────────┘
//!                                 ▼
//!                             GET /sync
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{full_tree, get, send, BridgeTree};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bridge_runtime::{BridgeConfig, BridgeContext, BridgeRuntime};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use shared_bus::{
        DrainScheduler, EventPublisher, EventRouter, FileReceiptSink, InMemoryEventQueue,
        InMemoryReceiptLog, QueueJournal, SatelliteConnection, SatelliteError, QUEUE_JOURNAL_FILE,
        RECEIPTS_DIR,
    };
    use shared_types::{BridgeEvent, DispatchOutcome};
    use std::sync::Arc;
    use std::time::Duration;
    use tb_02_registry_api::{build_router, ApiConfig, AppState};

    const KEY: &str = "integration-key";

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Records every event type it sees.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SatelliteConnection for Recorder {
        async fn handle(&self, event: &BridgeEvent) -> Result<(), SatelliteError> {
            self.seen.lock().push(event.event_type.clone());
            Ok(())
        }
    }

    struct Refusing;

    #[async_trait]
    impl SatelliteConnection for Refusing {
        async fn handle(&self, _event: &BridgeEvent) -> Result<(), SatelliteError> {
            Err(SatelliteError::Rejected {
                satellite: "stone-grimoire".into(),
                reason: "sealed".into(),
            })
        }
    }

    fn api_config(tree: &BridgeTree) -> ApiConfig {
        let mut config = ApiConfig {
            paths: tree.paths.clone(),
            ..ApiConfig::default()
        };
        config.auth.api_key = Some(KEY.into());
        config
    }

    fn post_event(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {KEY}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    #[tokio::test]
    async fn test_fifo_across_satellites() {
        let queue = Arc::new(InMemoryEventQueue::new());
        let log = Arc::new(InMemoryReceiptLog::new());
        let cosmo = Arc::new(Recorder::default());
        let codex = Arc::new(Recorder::default());

        let mut router = EventRouter::new(queue.clone(), log.clone());
        router.register("cosmogenesis", cosmo.clone());
        router.register("codex-1499", codex.clone());

        let ids: Vec<_> = [
            ("cosmogenesis", "a"),
            ("codex-1499", "b"),
            ("unmapped", "c"),
            ("cosmogenesis", "d"),
            ("codex-1499", "e"),
        ]
        .into_iter()
        .map(|(source, kind)| queue.enqueue(source, kind, Value::Null))
        .collect();

        while router.drain_one().await.is_some() {}

        let receipts = log.receipts();
        let drained: Vec<_> = receipts.iter().map(|r| r.event.id.clone()).collect();
        assert_eq!(drained, ids);
        assert!(receipts.iter().all(|r| r.processed));
        assert_eq!(receipts[2].outcome, DispatchOutcome::UnknownSource);

        assert_eq!(*cosmo.seen.lock(), ["a", "d"]);
        assert_eq!(*codex.seen.lock(), ["b", "e"]);
    }

    #[tokio::test]
    async fn test_handler_failure_does_not_stall_queue() {
        let queue = Arc::new(InMemoryEventQueue::new());
        let log = Arc::new(InMemoryReceiptLog::new());
        let recorder = Arc::new(Recorder::default());

        let mut router = EventRouter::new(queue.clone(), log.clone());
        router.register("stone-grimoire", Arc::new(Refusing));
        router.register("circuitum99", recorder.clone());

        queue.enqueue("stone-grimoire", "inscribe", Value::Null);
        queue.enqueue("circuitum99", "pulse", Value::Null);

        while router.drain_one().await.is_some() {}

        let outcomes: Vec<_> = log.receipts().iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            [DispatchOutcome::HandlerFailed, DispatchOutcome::Delivered]
        );
        assert_eq!(*recorder.seen.lock(), ["pulse"]);
        assert!(queue.is_empty());
    }

    // =========================================================================
    // JOURNAL → /sync
    // =========================================================================

    #[tokio::test]
    async fn test_sync_reflects_pending_and_receipts() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let events_dir = tree.events().to_path_buf();

        let receipts = Arc::new(FileReceiptSink::new(events_dir.join(RECEIPTS_DIR)));
        let mut router = EventRouter::new(context.queue.clone(), receipts);
        router.register("living-arcanae", Arc::new(Recorder::default()));
        let router = Arc::new(router);

        let first = context.queue.enqueue("living-arcanae", "draw", json!({"card": "XVII"}));
        let second = context.queue.enqueue("living-arcanae", "draw", json!({"card": "XVIII"}));
        let third = context.queue.enqueue("living-arcanae", "shuffle", Value::Null);

        let mut scheduler = DrainScheduler::new(router, Duration::from_secs(1))
            .with_journal(QueueJournal::new(events_dir.join(QUEUE_JOURNAL_FILE)));
        scheduler.tick().await;

        let config = api_config(&tree);
        let app = build_router(
            AppState::new(context.store.clone(), context.queue.clone(), &config),
            &config,
        );
        let (status, body) = send(&app, get("/sync")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ids"]["version"], 3);
        assert_eq!(body["manifest"]["realms"][0], "cosmogenesis");
        assert!(body["generatedAt"].is_string());

        let pending: Vec<_> = body["pendingEvents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(pending, [second.to_string(), third.to_string()]);
        assert_eq!(body["pendingEvents"][0]["data"]["card"], "XVIII");

        assert_eq!(body["receipts"], json!([format!("{first}.json")]));
    }

    #[tokio::test]
    async fn test_sync_on_fresh_tree() {
        let tree = full_tree();
        let context = BridgeContext::load(&tree.paths).await;
        let config = api_config(&tree);
        let app = build_router(
            AppState::new(context.store.clone(), context.queue.clone(), &config),
            &config,
        );

        let (status, body) = send(&app, get("/sync")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pendingEvents"], json!([]));
        assert_eq!(body["receipts"], json!([]));
    }

    // =========================================================================
    // FULL RUNTIME
    // =========================================================================

    #[tokio::test]
    async fn test_post_event_through_runtime_to_receipt() {
        let tree = full_tree();
        let mut config = BridgeConfig::default();
        config.http.enabled = false;
        config.paths = tree.paths.clone();
        config.auth.api_key = Some(KEY.into());
        config.router.drain_interval = Duration::from_millis(20);

        let mut runtime = BridgeRuntime::new(config.clone()).unwrap();
        runtime.start().await.unwrap();

        // In-process HTTP surface over the runtime's own store and queue.
        let api_config = config.api_config();
        let app = build_router(
            AppState::new(
                runtime.store().unwrap(),
                runtime.queue().unwrap(),
                &api_config,
            ),
            &api_config,
        );

        let (status, body) = send(
            &app,
            post_event(json!({"source": "magical-mystery-house", "type": "open-door", "data": {"room": 7}})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let id = body["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("EVT-"));

        let (status, body) = send(&app, post_event(json!({"source": "cosmogenesis"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("type"));

        let receipt_name = format!("{id}.json");
        let mut receipts = json!([]);
        for _ in 0..100 {
            let (_, body) = send(&app, get("/sync")).await;
            receipts = body["receipts"].clone();
            if receipts == json!([receipt_name.clone()]) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(receipts, json!([receipt_name]));

        runtime.shutdown().await;

        let (_, body) = send(&app, get("/sync")).await;
        assert_eq!(body["pendingEvents"], json!([]));

        let stored: Value = serde_json::from_str(
            &std::fs::read_to_string(
                tree.events().join(RECEIPTS_DIR).join(format!("{id}.json")),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(stored["processed"], true);
        assert_eq!(stored["outcome"], "delivered");
        assert_eq!(stored["event"]["source"], "magical-mystery-house");
        assert_eq!(stored["event"]["type"], "open-door");
        assert_eq!(stored["event"]["data"]["room"], 7);
    }
}
