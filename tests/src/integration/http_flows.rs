//! # HTTP Flows
//!
//! REST endpoints end to end: validation, relay to the job queue, graph
//! documents on disk, node catalog and correlated exchanges answered
//! through `POST /state`.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use serde_json::json;

    use crate::harness::TestBridge;

    // =============================================================================
    // VALIDATION
    // =============================================================================

    #[tokio::test]
    async fn test_malformed_bodies_are_rejected_uniformly() {
        let bridge = TestBridge::spawn().await;

        for path in ["/command", "/batch", "/queue", "/save", "/load", "/state"] {
            let (status, body) = bridge.post_raw(path, "{not json").await;
            assert_eq!(status, 400, "{path}");
            assert_eq!(body, json!({"error": "invalid JSON"}), "{path}");
        }

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_missing_fields_are_named() {
        let bridge = TestBridge::spawn().await;

        let cases = [
            ("/command", json!({"payload": 1}), "missing field: type"),
            ("/batch", json!({}), "missing field: commands"),
            ("/queue", json!({"prompt": {}}), "missing field: prompt"),
            ("/save", json!({"graph": {}}), "missing field: filename"),
            ("/load", json!({"filename": ""}), "missing field: filename"),
        ];
        for (path, body, expected) in cases {
            let (status, response) = bridge.post(path, body).await;
            assert_eq!(status, 400, "{path}");
            assert_eq!(response["error"], expected, "{path}");
        }

        bridge.stop().await;
    }

    // =============================================================================
    // COMMANDS AND QUEUE
    // =============================================================================

    #[tokio::test]
    async fn test_command_without_editors_is_acknowledged() {
        let bridge = TestBridge::spawn().await;

        let (status, body) = bridge.post("/command", json!({"type": "clear_graph"})).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"ok": true}));
        assert_eq!(bridge.health().await["stats"]["messages_published"], 1);

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_batch_reports_skipped_items() {
        let bridge = TestBridge::spawn().await;

        let (status, body) = bridge
            .post(
                "/batch",
                json!({"commands": [
                    {"type": "create_node", "node_type": "KSampler"},
                    {"node_type": "orphan"},
                    {"type": "connect_nodes"}
                ]}),
            )
            .await;

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({"ok": true, "count": 2, "errors": [{"index": 1, "error": "missing field: type"}]})
        );
        assert_eq!(bridge.health().await["stats"]["messages_published"], 2);

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_queue_relays_prompt() {
        let bridge = TestBridge::spawn().await;
        let prompt = json!({"3": {"class_type": "KSampler", "inputs": {"steps": 20}}});

        let (status, body) = bridge.post("/queue", json!({"prompt": prompt.clone()})).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({"ok": true, "prompt_id": "job-1"}));
        assert_eq!(bridge.queue.prompts(), vec![prompt]);

        bridge.stop().await;
    }

    // =============================================================================
    // DOCUMENTS
    // =============================================================================

    #[tokio::test]
    async fn test_save_then_load() {
        let bridge = TestBridge::spawn().await;
        let graph = json!({"nodes": [{"id": 1, "type": "KSampler"}], "links": []});

        let (status, _) = bridge
            .post("/save", json!({"filename": "portrait.json", "graph": graph.clone()}))
            .await;
        assert_eq!(status, 200);

        let (status, body) = bridge.post("/load", json!({"filename": "portrait.json"})).await;
        assert_eq!(status, 200);
        assert_eq!(body, json!({"ok": true, "graph": graph}));

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_traversal_and_unknown_names() {
        let bridge = TestBridge::spawn().await;

        let (status, body) = bridge
            .post("/save", json!({"filename": "../escape.json", "graph": {}}))
            .await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"error": "invalid filename: path traversal"}));

        let (status, body) = bridge.post("/load", json!({"filename": "never-saved.json"})).await;
        assert_eq!(status, 404);
        assert_eq!(body, json!({"error": "file not found"}));

        bridge.stop().await;
    }

    // =============================================================================
    // NODE CATALOG
    // =============================================================================

    #[tokio::test]
    async fn test_node_catalog() {
        let bridge = TestBridge::spawn().await;

        let (status, all) = bridge.get("/node_types").await;
        assert_eq!(status, 200);
        assert_eq!(all.as_object().unwrap().len(), 3);
        assert_eq!(all["CheckpointLoaderSimple"]["output"], json!(["MODEL", "CLIP", "VAE"]));

        let (_, filtered) = bridge.get("/node_types?category=^lat").await;
        let names: Vec<_> = filtered.as_object().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["VAEDecode".to_string()]);

        let (status, detail) = bridge.get("/all_nodes").await;
        assert_eq!(status, 200);
        assert_eq!(detail["KSampler"]["description"], "Denoise a latent");
        assert_eq!(
            detail["KSampler"]["inputs"],
            json!([{"name": "model", "type": "MODEL"}, {"name": "steps", "type": "INT"}])
        );

        bridge.stop().await;
    }

    // =============================================================================
    // CORRELATED EXCHANGE
    // =============================================================================

    #[tokio::test]
    async fn test_request_answered_through_state_push() {
        let bridge = std::sync::Arc::new(TestBridge::spawn().await);

        let requester = {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .post("/request", json!({"request_id": "h1", "action": "get_graph"}))
                    .await
            })
        };

        bridge.wait_for_health(|h| h["pending"] == 1).await;
        let (status, _) = bridge
            .post("/state", json!({"request_id": "h1", "data": {"nodes": [7]}}))
            .await;
        assert_eq!(status, 200);

        let (status, reply) = requester.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(
            reply,
            json!({"request_id": "h1", "status": "ok", "data": {"nodes": [7]}})
        );
        assert_eq!(bridge.health().await["pending"], 0);
    }

    #[tokio::test]
    async fn test_request_times_out() {
        let bridge = TestBridge::spawn().await;

        let started = Instant::now();
        let (status, reply) = bridge
            .post("/request?timeout=200ms", json!({"request_id": "lost"}))
            .await;

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(status, 504);
        assert_eq!(
            reply,
            json!({"request_id": "lost", "status": "error", "message": "timeout"})
        );

        let health = bridge.health().await;
        assert_eq!(health["pending"], 0);
        assert_eq!(health["stats"]["exchanges"]["timeouts"], 1);

        // A late reply has nobody waiting and lands in Last-Observed
        bridge
            .post("/state", json!({"request_id": "lost", "data": {"late": true}}))
            .await;
        let (_, state) = bridge.get("/state").await;
        assert_eq!(state, json!({"ok": true, "state": {"late": true}}));

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_request_without_id() {
        let bridge = TestBridge::spawn().await;

        let (status, reply) = bridge.post("/request", json!({"action": "get_graph"})).await;

        assert_eq!(status, 400);
        assert_eq!(
            reply,
            json!({"status": "error", "message": "missing field: request_id"})
        );

        bridge.stop().await;
    }

    #[tokio::test]
    async fn test_untagged_state_is_observed() {
        let bridge = TestBridge::spawn().await;

        let (_, before) = bridge.get("/state").await;
        assert_eq!(before, json!({"ok": true, "state": null}));

        bridge.post("/state", json!({"data": {"nodes": []}})).await;
        let (_, after) = bridge.get("/state").await;
        assert_eq!(after, json!({"ok": true, "state": {"nodes": []}}));

        bridge.stop().await;
    }
}
