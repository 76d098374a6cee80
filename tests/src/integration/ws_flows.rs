//! # WebSocket Flows
//!
//! Editors connected over `/ws`: broadcast fan-out, correlated requests
//! answered by `graph_state` pushes, and protocol errors that must not
//! drop the connection.
//!
//! ## Flows Tested:
//!
//! 1. **HTTP → every editor**: `/command`, `/batch` and `/load` fan out
//! 2. **Editor → editor**: a request from one editor answered by another
//! 3. **HTTP → editor → HTTP**: `/request` answered over the socket
//! 4. **Protocol errors**: bad frames get an error frame, socket stays open

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use graph_bus::{GRAPH_COMMAND_CHANNEL, GRAPH_REQUEST_CHANNEL};
    use serde_json::json;

    use crate::harness::TestBridge;

    // =============================================================================
    // FAN-OUT
    // =============================================================================

    #[tokio::test]
    async fn test_command_reaches_every_editor() {
        let bridge = TestBridge::spawn().await;
        let mut first = bridge.connect_editor().await;
        let mut second = bridge.connect_editor().await;

        let (status, _) = bridge
            .post("/command", json!({"type": "create_node", "node_type": "KSampler"}))
            .await;
        assert_eq!(status, 200);

        for editor in [&mut first, &mut second] {
            let frame = editor.next_json().await;
            assert_eq!(
                frame,
                json!({
                    "type": GRAPH_COMMAND_CHANNEL,
                    "data": {"type": "create_node", "node_type": "KSampler"}
                })
            );
        }

        first.close().await;
        second.close().await;
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let bridge = TestBridge::spawn().await;
        let mut editor = bridge.connect_editor().await;

        bridge
            .post(
                "/batch",
                json!({"commands": [{"type": "a"}, {"kind": "skipped"}, {"type": "b"}, {"type": "c"}]}),
            )
            .await;

        let mut seen = Vec::new();
        for _ in 0..3 {
            let frame = editor.next_on_channel(GRAPH_COMMAND_CHANNEL).await;
            seen.push(frame["data"]["type"].as_str().unwrap().to_string());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
        editor.expect_silence(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn test_load_pushes_graph_to_editor() {
        let bridge = TestBridge::spawn().await;
        let graph = json!({"nodes": [{"id": 3}]});
        bridge
            .post("/save", json!({"filename": "scene.json", "graph": graph.clone()}))
            .await;

        let mut editor = bridge.connect_editor().await;
        bridge.post("/load", json!({"filename": "scene.json"})).await;

        let frame = editor.next_on_channel(GRAPH_COMMAND_CHANNEL).await;
        assert_eq!(frame["data"], json!({"type": "load_graph", "graph_data": graph}));
    }

    // =============================================================================
    // CORRELATED EXCHANGE
    // =============================================================================

    #[tokio::test]
    async fn test_editor_request_answered_by_other_editor() {
        let bridge = TestBridge::spawn().await;
        let mut asker = bridge.connect_editor().await;
        let mut answerer = bridge.connect_editor().await;

        asker
            .send_json(json!({"request_id": "ws-1", "action": "get_graph"}))
            .await;

        let request = answerer.next_on_channel(GRAPH_REQUEST_CHANNEL).await;
        assert_eq!(request["data"]["request_id"], "ws-1");

        answerer
            .send_json(json!({"type": "graph_state", "request_id": "ws-1", "data": {"nodes": [1]}}))
            .await;

        // The asker sees its own broadcast first
        let reply = asker.next_matching(|f| f.get("status").is_some()).await;
        assert_eq!(
            reply,
            json!({"request_id": "ws-1", "status": "ok", "data": {"nodes": [1]}})
        );
        assert_eq!(bridge.health().await["pending"], 0);
    }

    #[tokio::test]
    async fn test_http_request_answered_over_socket() {
        let bridge = std::sync::Arc::new(TestBridge::spawn().await);
        let mut editor = bridge.connect_editor().await;

        let requester = {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .post("/request", json!({"request_id": 99, "action": "get_graph"}))
                    .await
            })
        };

        let request = editor.next_on_channel(GRAPH_REQUEST_CHANNEL).await;
        assert_eq!(request["data"]["action"], "get_graph");

        // Numeric ids match their string form
        editor
            .send_json(json!({"type": "graph_state", "request_id": "99", "data": {"links": []}}))
            .await;

        let (status, reply) = requester.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(
            reply,
            json!({"request_id": "99", "status": "ok", "data": {"links": []}})
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_on_one_socket() {
        let bridge = TestBridge::spawn().await;
        let mut asker = bridge.connect_editor().await;
        let mut answerer = bridge.connect_editor().await;

        asker.send_json(json!({"request_id": "slow"})).await;
        asker.send_json(json!({"request_id": "fast"})).await;
        answerer.next_on_channel(GRAPH_REQUEST_CHANNEL).await;
        answerer.next_on_channel(GRAPH_REQUEST_CHANNEL).await;

        // Answer out of order; each reply still reaches its own request
        answerer
            .send_json(json!({"type": "graph_state", "request_id": "fast", "data": "F"}))
            .await;
        answerer
            .send_json(json!({"type": "graph_state", "request_id": "slow", "data": "S"}))
            .await;

        let first = asker.next_matching(|f| f.get("status").is_some()).await;
        let second = asker.next_matching(|f| f.get("status").is_some()).await;
        let mut replies = vec![first, second];
        replies.sort_by_key(|r| r["request_id"].as_str().unwrap().to_string());
        assert_eq!(
            replies,
            vec![
                json!({"request_id": "fast", "status": "ok", "data": "F"}),
                json!({"request_id": "slow", "status": "ok", "data": "S"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_unanswered_socket_request_times_out() {
        let bridge = TestBridge::spawn_with(|config| {
            config.timeouts.exchange = Duration::from_millis(200);
        })
        .await;
        let mut editor = bridge.connect_editor().await;

        editor.send_json(json!({"request_id": "void"})).await;

        let reply = editor.next_matching(|f| f.get("status").is_some()).await;
        assert_eq!(
            reply,
            json!({"request_id": "void", "status": "error", "message": "timeout"})
        );
        assert_eq!(bridge.health().await["pending"], 0);
    }

    #[tokio::test]
    async fn test_untagged_push_becomes_last_observed() {
        let bridge = TestBridge::spawn().await;
        let mut editor = bridge.connect_editor().await;

        editor
            .send_json(json!({"type": "graph_state", "data": {"nodes": [5]}}))
            .await;

        bridge
            .wait_for_health(|h| h["stats"]["exchanges"]["observed"] == 1)
            .await;
        let (_, state) = bridge.get("/state").await;
        assert_eq!(state, json!({"ok": true, "state": {"nodes": [5]}}));
        editor.expect_silence(Duration::from_millis(100)).await;
    }

    // =============================================================================
    // PROTOCOL ERRORS
    // =============================================================================

    #[tokio::test]
    async fn test_invalid_frame_keeps_connection_open() {
        let bridge = TestBridge::spawn().await;
        let mut editor = bridge.connect_editor().await;

        editor.send_text("this is not json").await;
        assert_eq!(
            editor.next_json().await,
            json!({"status": "error", "message": "invalid JSON"})
        );

        editor.send_json(json!({"action": "no id"})).await;
        assert_eq!(
            editor.next_json().await,
            json!({"status": "error", "message": "missing field: request_id"})
        );

        // Still subscribed
        bridge.post("/command", json!({"type": "ping"})).await;
        let frame = editor.next_on_channel(GRAPH_COMMAND_CHANNEL).await;
        assert_eq!(frame["data"]["type"], "ping");
        assert_eq!(bridge.health().await["connections"], 1);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let bridge = TestBridge::spawn_with(|config| {
            config.websocket.max_message_size = 64;
        })
        .await;
        let mut editor = bridge.connect_editor().await;

        let padding = "x".repeat(256);
        editor
            .send_json(json!({"request_id": "big", "padding": padding}))
            .await;

        assert_eq!(
            editor.next_json().await,
            json!({"status": "error", "message": "message too large"})
        );
        assert_eq!(bridge.health().await["pending"], 0);
    }

    #[tokio::test]
    async fn test_disconnect_is_tracked() {
        let bridge = TestBridge::spawn().await;
        let editor = bridge.connect_editor().await;
        assert_eq!(bridge.health().await["connections"], 1);

        editor.close().await;
        bridge.wait_for_health(|h| h["connections"] == 0).await;
        assert_eq!(bridge.health().await["stats"]["connections_opened"], 1);
    }
}
