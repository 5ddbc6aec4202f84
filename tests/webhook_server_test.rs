//! Integration tests for the webhook listener
//!
//! Most cases drive the router in-process; the lifecycle tests go through a
//! real socket.

#[cfg(feature = "server")]
mod webhook_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderValue, Request, StatusCode};
    use axum::Router;
    use noxpay_sdk::observability::Logger;
    use noxpay_sdk::webhook::handler::MAX_BODY_BYTES;
    use noxpay_sdk::webhook::signature::compute_signature;
    use noxpay_sdk::webhook::{WebhookEvent, WebhookHandler, WebhookServer};
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    const SECRET: &str = "whsec_integration";

    #[derive(Default)]
    struct RecordingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn record(&self, level: &str, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("{} {}", level, message));
        }

        fn contains(&self, needle: &str) -> bool {
            self.lines.lock().unwrap().iter().any(|l| l.contains(needle))
        }
    }

    impl Logger for RecordingLogger {
        fn debug(&self, message: &str) {
            self.record("DEBUG", message);
        }
        fn info(&self, message: &str) {
            self.record("INFO", message);
        }
        fn warn(&self, message: &str) {
            self.record("WARN", message);
        }
        fn error(&self, message: &str) {
            self.record("ERROR", message);
        }
    }

    struct CollectingHandler {
        events: Mutex<Vec<WebhookEvent>>,
    }

    #[async_trait]
    impl WebhookHandler for CollectingHandler {
        async fn handle(&self, event: &WebhookEvent) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl WebhookHandler for FailingHandler {
        async fn handle(&self, _event: &WebhookEvent) -> anyhow::Result<()> {
            anyhow::bail!("ledger unavailable: db://internal-host")
        }
    }

    fn router() -> Router {
        WebhookServer::new(SECRET).router()
    }

    fn post(path: &str, body: &str, header: Option<(&str, &str)>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn signed(body: &str) -> Request<Body> {
        let signature = compute_signature(SECRET, body.as_bytes());
        post("/", body, Some(("X-Signature", &signature)))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_get_is_liveness_without_signature() {
        let request = Request::builder()
            .method("GET")
            .uri("/")
            .header("X-Signature", "garbage")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Webhook endpoint is active"}));
    }

    #[tokio::test]
    async fn test_missing_payload_or_signature() {
        let payload = r#"{"status":"paid"}"#;
        let signature = compute_signature(SECRET, payload.as_bytes());
        let cases = vec![
            post("/", "", None),
            post("/", payload, None),
            post("/", "", Some(("X-Signature", &signature))),
            post("/", payload, Some(("X-Signature", ""))),
            post("/", "", Some(("noxpay-sign", ""))),
        ];

        for request in cases {
            let (status, body) = send(router(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Missing payload or signature"}));
        }
    }

    #[tokio::test]
    async fn test_wrong_signature_is_unauthorized() {
        let payload = r#"{"status":"paid","amount":10}"#;
        let wrong = compute_signature("other-secret", payload.as_bytes());

        let (status, body) = send(router(), post("/", payload, Some(("X-Signature", &wrong)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid signature"}));
    }

    #[tokio::test]
    async fn test_non_ascii_signature_is_unauthorized() {
        let payload = r#"{"status":"paid"}"#;
        let good = compute_signature(SECRET, payload.as_bytes());
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .header("X-Signature", HeaderValue::from_bytes(b"abc\xff").unwrap())
            .header("noxpay-sign", good)
            .body(Body::from(payload))
            .unwrap();

        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid signature"}));
    }

    #[tokio::test]
    async fn test_oversized_body_checks_signature_header_first() {
        let huge = "x".repeat(MAX_BODY_BYTES + 1);

        let (status, body) = send(router(), post("/", &huge, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing payload or signature"}));

        let (status, body) = send(router(), post("/", &huge, Some(("X-Signature", "sig")))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid payload"}));
    }

    #[tokio::test]
    async fn test_blank_secret_never_accepts() {
        let payload = r#"{"status":"paid"}"#;
        let forged = compute_signature("", payload.as_bytes());

        let router = WebhookServer::new("").router();
        let (status, body) = send(router, post("/", payload, Some(("X-Signature", &forged)))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing webhook"}));
    }

    #[tokio::test]
    async fn test_signature_gate_applies_to_any_path() {
        let (status, _) = send(router(), post("/other", r#"{"a":1}"#, Some(("X-Signature", "bad")))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body = r#"{"a":1}"#;
        let signature = compute_signature(SECRET, body.as_bytes());
        let (status, body) = send(router(), post("/other", body, Some(("X-Signature", &signature)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_valid_signature_with_invalid_json() {
        for payload in ["not json", "{}", "[]"] {
            let (status, body) = send(router(), signed(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {:?}", payload);
            assert_eq!(body, json!({"error": "Invalid payload"}));
        }
    }

    #[tokio::test]
    async fn test_accepted_event_is_normalized() {
        let payload = r#"{"status":"paid","webhook_url_text":"x","amount":10}"#;

        let (status, body) = send(router(), signed(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["message"], "Event processed successfully");
        assert_eq!(body["data"]["event"], "paid");
        assert_eq!(body["data"]["data"]["amount"], 10);
        assert!(body["data"]["data"].get("webhook_url_text").is_none());
    }

    #[tokio::test]
    async fn test_alternate_header_and_unknown_event() {
        let payload = r#"{"txid":"T-77"}"#;
        let signature = compute_signature(SECRET, payload.as_bytes());

        let (status, body) = send(router(), post("/", payload, Some(("noxpay-sign", &signature)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["event"], "unknown");
    }

    #[tokio::test]
    async fn test_handler_receives_stripped_event() {
        let handler = Arc::new(CollectingHandler {
            events: Mutex::new(Vec::new()),
        });
        let router = WebhookServer::new(SECRET)
            .with_handler(handler.clone())
            .router();
        let payload = r#"{"status":"cancelled","webhook_url_text":"https://x","txid":"T1"}"#;

        let (status, _) = send(router, signed(payload)).await;
        assert_eq!(status, StatusCode::OK);

        let events = handler.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name(), Some("cancelled"));
        assert!(!events[0].data().contains_key("webhook_url_text"));
        assert_eq!(events[0].raw_payload(), payload.as_bytes());
    }

    #[tokio::test]
    async fn test_handler_failure_is_opaque_500() {
        let logger = Arc::new(RecordingLogger::default());
        let router = WebhookServer::new(SECRET)
            .with_logger(logger.clone())
            .with_handler(Arc::new(FailingHandler))
            .router();

        let (status, body) = send(router, signed(r#"{"status":"paid"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Error processing webhook"}));
        assert!(logger.contains("ledger unavailable"));
        assert!(!logger.contains(SECRET));
    }

    #[tokio::test]
    async fn test_serves_over_socket_and_drains_on_stop() {
        struct SlowHandler {
            started: Notify,
        }

        #[async_trait]
        impl WebhookHandler for SlowHandler {
            async fn handle(&self, _event: &WebhookEvent) -> anyhow::Result<()> {
                self.started.notify_one();
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok(())
            }
        }

        let handler = Arc::new(SlowHandler {
            started: Notify::new(),
        });
        let mut server = WebhookServer::new(SECRET)
            .with_handler(handler.clone())
            .with_shutdown_grace(Duration::from_secs(5));
        let addr = server.start("127.0.0.1", 0, None).await.unwrap();
        let url = format!("http://{}/", addr);
        let client = reqwest::Client::new();

        let live = client.get(&url).send().await.unwrap();
        assert_eq!(live.status().as_u16(), 200);

        let payload = r#"{"status":"paid","amount":10}"#;
        let signature = compute_signature(SECRET, payload.as_bytes());
        let in_flight = tokio::spawn({
            let client = client.clone();
            let url = url.clone();
            async move {
                client
                    .post(&url)
                    .header("X-Signature", signature)
                    .header("content-type", "application/json")
                    .body(payload)
                    .send()
                    .await
            }
        });

        handler.started.notified().await;
        server.stop().await.unwrap();

        let response = in_flight.await.unwrap().unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["event"], "paid");

        assert!(reqwest::Client::new().get(&url).send().await.is_err());
    }
}
