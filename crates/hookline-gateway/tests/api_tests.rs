// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router tests driven in-process, no socket involved.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use hookline_core::{TranscriptStore, WebhookTransport};
use hookline_gateway::{GatewayState, router};
use hookline_test_utils::TestHarness;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "hookline-test-boundary";

fn app(h: &TestHarness) -> Router {
    let store: Arc<dyn TranscriptStore> = h.store.clone();
    let transport: Arc<dyn WebhookTransport> = h.transport.clone();
    router(GatewayState::new(store, transport))
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn call_raw(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, bytes.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_send(text: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{text}\r\n"
        )
        .as_bytes(),
    );
    for (name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/session/send")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_endpoint(app: &Router, name: &str) -> i64 {
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/api/endpoints",
            json!({"name": name, "url": "https://example.test/hook", "credential": "tok"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let h = TestHarness::builder().build().await.unwrap();
    let (status, body) = call(&app(&h), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "healthy");
}

#[tokio::test]
async fn endpoints_are_listed_without_credentials() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let id = create_endpoint(&app, "demo").await;

    let (status, body) = call(&app, get("/api/endpoints")).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["name"], "demo");
    assert!(list[0].get("credential").is_none());

    let (status, body) = call(&app, get(&format!("/api/endpoints/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("credential").is_none());
}

#[tokio::test]
async fn duplicate_endpoint_name_is_a_bad_request() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    create_endpoint(&app, "demo").await;

    let (status, body) = call(
        &app,
        json_request(
            "POST",
            "/api/endpoints",
            json!({"name": "demo", "url": "https://other.test", "credential": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn invalid_url_is_a_bad_request() {
    let h = TestHarness::builder().build().await.unwrap();
    let (status, _) = call(
        &app(&h),
        json_request(
            "POST",
            "/api/endpoints",
            json!({"name": "demo", "url": "not a url", "credential": "tok"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);

    let (status, body) = call(&app, get("/api/endpoints/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "endpoint 42 not found");

    let request = Request::delete("/api/conversations/42")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, get("/api/conversations/42/messages")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversation_lifecycle() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let endpoint_id = create_endpoint(&app, "demo").await;

    let (status, conversation) = call(
        &app,
        json_request(
            "POST",
            "/api/conversations",
            json!({"endpoint_id": endpoint_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(conversation["name"], "demo");
    assert_eq!(conversation["endpoint_name"], "demo");
    let id = conversation["id"].as_i64().unwrap();

    let (status, renamed) = call(
        &app,
        json_request(
            "PATCH",
            &format!("/api/conversations/{id}"),
            json!({"name": "Renamed"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Renamed");

    let (status, created) = call(
        &app,
        json_request(
            "POST",
            "/api/messages",
            json!({"conversation_id": id, "content": "hi", "is_user": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_i64().is_some());

    let (_, messages) = call(&app, get(&format!("/api/conversations/{id}/messages"))).await;
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["author"], "user");

    // Deleting the endpoint takes its conversations with it.
    let request = Request::delete(format!("/api/endpoints/{endpoint_id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = call(&app, get("/api/conversations")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn session_send_round_trip() {
    let h = TestHarness::builder()
        .with_replies(vec!["Hi there".into()])
        .build()
        .await
        .unwrap();
    let app = app(&h);
    let endpoint_id = create_endpoint(&app, "demo").await;

    let (status, conversation) = call(
        &app,
        json_request(
            "POST",
            "/api/session/start",
            json!({"endpoint_id": endpoint_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, outcome) = call(&app, multipart_send("Hello", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["entry"]["content"], "Hi there");
    assert_eq!(outcome["renamed"]["name"], "Hello");
    assert!(outcome["error"].is_null());

    let (_, snapshot) = call(&app, get("/api/session")).await;
    assert_eq!(snapshot["conversation_id"], conversation["id"]);
    assert_eq!(snapshot["state"], "idle");
    assert_eq!(snapshot["transcript"].as_array().unwrap().len(), 2);
    assert!(snapshot["endpoint"].get("credential").is_none());
}

#[tokio::test]
async fn session_send_forwards_image_files() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let endpoint_id = create_endpoint(&app, "demo").await;
    call(
        &app,
        json_request(
            "POST",
            "/api/session/activate",
            json!({"endpoint_id": endpoint_id}),
        ),
    )
    .await;

    let (status, _) = call(
        &app,
        multipart_send(
            "pictures",
            &[
                ("a.png", "image/png", &[1u8, 2, 3][..]),
                ("notes.txt", "text/plain", &b"text"[..]),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = h.transport.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "pictures");
    assert_eq!(requests[0].files.len(), 1);
    assert_eq!(requests[0].files[0].name, "a.png");
    assert_eq!(requests[0].files[0].bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn session_send_without_endpoint_conflicts() {
    let h = TestHarness::builder().build().await.unwrap();
    let (status, body) = call(&app(&h), multipart_send("Hello", &[])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no active endpoint selected");
}

#[tokio::test]
async fn session_transport_failure_is_reported_in_the_outcome() {
    let h = TestHarness::builder().build().await.unwrap();
    h.transport
        .push_failure("endpoint returned 502 Bad Gateway: upstream", Some(502))
        .await;
    let app = app(&h);
    let endpoint_id = create_endpoint(&app, "demo").await;
    call(
        &app,
        json_request(
            "POST",
            "/api/session/start",
            json!({"endpoint_id": endpoint_id}),
        ),
    )
    .await;

    let (status, outcome) = call(&app, multipart_send("Hello", &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(outcome["entry"]["content"]
        .as_str()
        .unwrap()
        .starts_with("Error: "));
    assert!(outcome["error"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn overlapping_sends_conflict() {
    let h = TestHarness::builder()
        .with_delay(Duration::from_millis(300))
        .build()
        .await
        .unwrap();
    let app = app(&h);
    let endpoint_id = create_endpoint(&app, "demo").await;
    call(
        &app,
        json_request(
            "POST",
            "/api/session/start",
            json!({"endpoint_id": endpoint_id}),
        ),
    )
    .await;

    let first = {
        let app = app.clone();
        tokio::spawn(async move { call(&app, multipart_send("first", &[])).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = call(&app, multipart_send("second", &[])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("in flight"));

    let (status, body) = call(&app, get("/api/session")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "sending");
    let transcript = body["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0]["content"], "first");

    let (status, _) = call(
        &app,
        json_request("POST", "/api/session/activate", json!({"endpoint_id": endpoint_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, get("/api/session")).await;
    assert_eq!(body["state"], "idle");
    assert_eq!(body["transcript"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn activate_missing_endpoint_resets_the_session() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);

    let (status, _) = call(
        &app,
        json_request("POST", "/api/session/activate", json!({"endpoint_id": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, snapshot) = call(&app, get("/api/session")).await;
    assert!(snapshot["endpoint"].is_null());
    assert_eq!(snapshot["transcript"].as_array().unwrap().len(), 1);
    assert!(snapshot["last_error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn clear_empties_the_session_transcript() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);

    let request = Request::post("/api/session/clear").body(Body::empty()).unwrap();
    let (status, _) = call(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, snapshot) = call(&app, get("/api/session")).await;
    assert!(snapshot["transcript"].as_array().unwrap().is_empty());
}

async fn stored_message(app: &Router, attachments: Value) -> i64 {
    let endpoint_id = create_endpoint(app, "files").await;
    let (_, conversation) = call(
        app,
        json_request("POST", "/api/conversations", json!({"endpoint_id": endpoint_id})),
    )
    .await;
    let (status, body) = call(
        app,
        json_request(
            "POST",
            "/api/messages",
            json!({
                "conversation_id": conversation["id"],
                "content": "see attached",
                "is_user": false,
                "attachments": attachments,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn attachment_download_serves_decoded_bytes() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let id = stored_message(
        &app,
        json!({"data0": {"mimeType": "image/png", "data": "AQID", "fileName": "x.png"}}),
    )
    .await;

    let (status, headers, bytes) =
        call_raw(&app, get(&format!("/api/messages/{id}/attachments/data0"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(headers[header::CONTENT_DISPOSITION], "inline; filename=\"x.png\"");
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn attachment_download_unknown_key_or_message_is_not_found() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let id = stored_message(
        &app,
        json!({"data0": {"mimeType": "image/png", "data": "AQID"}}),
    )
    .await;

    let (status, body) = call(&app, get(&format!("/api/messages/{id}/attachments/data7"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("data7"));

    let (status, _) = call(&app, get("/api/messages/999/attachments/data0")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attachment_download_with_bad_payload_is_unprocessable() {
    let h = TestHarness::builder().build().await.unwrap();
    let app = app(&h);
    let id = stored_message(
        &app,
        json!({
            "data0": {"mimeType": "image/png", "data": "!!not base64!!"},
            "data1": "just a string",
        }),
    )
    .await;

    let (status, body) = call(&app, get(&format!("/api/messages/{id}/attachments/data0"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("malformed attachment payload"));

    let (status, _) = call(&app, get(&format!("/api/messages/{id}/attachments/data1"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
