//! Behavior-driven tests for single requests through the Zendesk façade.
//!
//! A scripted in-memory transport stands in for the network so every test
//! controls exactly what the remote returns.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::json;
use zendesk_core::{
    ClientConfig, ClientEvent, EnvelopeKeys, FnEventHandler, HttpBody, HttpError, HttpMethod,
    HttpResponse, PathSpec, RequestError, Zendesk,
};
use zendesk_core_tests::{client_with, ScriptedHttpClient, REMOTE};

fn token_config() -> ClientConfig {
    ClientConfig::new(REMOTE, "agent@acme.test").with_token("api-token")
}

type EventLog = Arc<Mutex<Vec<String>>>;

fn recording_client(http: Arc<ScriptedHttpClient>) -> (Zendesk, EventLog) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let client = Zendesk::builder(token_config())
        .http_client(http)
        .event_handler(FnEventHandler::new(move |event| {
            let name = match event {
                ClientEvent::RequestAboutToBeSent { .. } => "request",
                ClientEvent::ResponseReceived { .. } => "response",
                ClientEvent::MalformedBody { .. } => "malformed",
                ClientEvent::TransportError { .. } => "transport_error",
                ClientEvent::Progress { .. } => "progress",
                ClientEvent::PaginationAborted { .. } => "pagination_aborted",
                ClientEvent::Throttled { .. } => "throttled",
                ClientEvent::Error { .. } => "error",
            };
            sink.lock().expect("event log").push(name.to_owned());
        }))
        .build()
        .expect("client should build");
    (client, log)
}

// =============================================================================
// URL assembly and headers on the wire
// =============================================================================

#[tokio::test]
async fn when_showing_a_view_the_segment_path_becomes_a_json_url() {
    // Given: A remote that returns one view
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(r#"{"view":{"id":7}}"#))]);
    let client = client_with(token_config(), Arc::clone(&http));

    // When: A view is shown
    let outcome = client.views().show(7).await.expect("show should succeed");

    // Then: The URL is remote + segments + .json and the envelope is unwrapped
    let requests = http.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, format!("{REMOTE}/views/7.json"));
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(outcome.body, json!({"id": 7}));
    assert_eq!(outcome.status, 200);
}

#[tokio::test]
async fn when_query_object_is_given_every_pair_reaches_the_query_string() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(r#"{"results":[]}"#))]);
    let client = client_with(token_config(), Arc::clone(&http));
    let resource = client.resource(EnvelopeKeys::new(&["results"]));

    resource
        .request(
            HttpMethod::Get,
            PathSpec::segments(["search"]).with_query([("a", 1), ("b", 2)]),
            None,
        )
        .await
        .expect("request should succeed");

    let url = &http.recorded_requests()[0].url;
    assert!(url.starts_with(&format!("{REMOTE}/search.json?")));
    assert!(url.contains("a=1"));
    assert!(url.contains("b=2"));
}

#[tokio::test]
async fn when_api_token_is_configured_basic_token_auth_is_sent() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json("{}"))]);
    let client = client_with(token_config(), Arc::clone(&http));

    client
        .resource(EnvelopeKeys::none())
        .request(HttpMethod::Get, PathSpec::segments(["users", "me"]), None)
        .await
        .expect("request should succeed");

    // base64("agent@acme.test/token:api-token")
    let request = &http.recorded_requests()[0];
    assert_eq!(
        request.header("authorization"),
        Some("Basic YWdlbnRAYWNtZS50ZXN0L3Rva2VuOmFwaS10b2tlbg==")
    );
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn when_oauth_is_enabled_bearer_token_is_sent() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json("{}"))]);
    let client = client_with(token_config().with_oauth(true), Arc::clone(&http));

    client
        .resource(EnvelopeKeys::none())
        .request(HttpMethod::Get, "/users/me.json", None)
        .await
        .expect("request should succeed");

    let request = &http.recorded_requests()[0];
    assert_eq!(request.url, format!("{REMOTE}/users/me.json"));
    assert_eq!(request.header("authorization"), Some("Bearer api-token"));
}

#[tokio::test]
async fn when_creating_a_view_the_body_is_serialized_and_empty_updates_send_braces() {
    let http = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::new(201, br#"{"view":{"id":1}}"#.to_vec())),
        Ok(HttpResponse::ok_json(r#"{"view":{"id":1}}"#)),
    ]);
    let client = client_with(token_config(), Arc::clone(&http));

    client
        .views()
        .create(json!({"view": {"title": "Open"}}))
        .await
        .expect("create should succeed");
    client
        .resource(EnvelopeKeys::none())
        .request(HttpMethod::Put, PathSpec::segments(["views", "1"]), None)
        .await
        .expect("update should succeed");

    let requests = http.recorded_requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(
        requests[0].body,
        Some(HttpBody::Json(String::from(r#"{"view":{"title":"Open"}}"#)))
    );
    assert_eq!(requests[1].body, Some(HttpBody::Json(String::from("{}"))));
}

// =============================================================================
// Response classification
// =============================================================================

#[tokio::test]
async fn when_retry_after_header_is_present_user_gets_rate_limit_error() {
    // Given: A 429 with Retry-After
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
        429,
        br#"{"error":"TooManyRequests"}"#.to_vec(),
    )
    .with_header("Retry-After", "60"))]);
    let client = client_with(token_config(), http);

    // When: Any request is made
    let error = client
        .views()
        .show(1)
        .await
        .expect_err("rate limit should fail");

    // Then: The error carries 429 and the header value
    let inner = error.inner();
    assert_eq!(inner.status_code(), Some(429));
    assert_eq!(inner.retry_after(), Some("60"));
    assert!(inner.is_rate_limited());
    assert!(error.to_string().starts_with("zendesk error: "));
}

#[tokio::test]
async fn when_status_is_in_failure_table_user_sees_fixed_reason() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
        422,
        br#"{"error":"RecordInvalid"}"#.to_vec(),
    ))]);
    let client = client_with(token_config(), http);

    let error = client
        .views()
        .create(json!({}))
        .await
        .expect_err("422 should fail");

    assert_eq!(
        error.inner().to_string(),
        "Zendesk Error (422): Unprocessable Entity"
    );
    assert_eq!(error.inner().retry_after(), None);
    assert_eq!(error.inner().result(), Some(&br#"{"error":"RecordInvalid"}"#[..]));
}

#[tokio::test]
async fn when_body_is_empty_user_gets_empty_result_with_204() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(200, Vec::new()))]);
    let client = client_with(token_config(), http);

    let error = client.views().export(3).await.expect_err("empty should fail");

    assert!(matches!(error.inner(), RequestError::EmptyResult));
    assert_eq!(error.inner().status_code(), Some(204));
}

#[tokio::test]
async fn when_body_is_not_json_request_succeeds_with_empty_body_and_diagnostic() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
        200,
        b"<html>maintenance</html>".to_vec(),
    ))]);
    let (client, log) = recording_client(http);

    let outcome = client.views().show(1).await.expect("malformed is not fatal");

    assert_eq!(outcome.body, json!(""));
    assert_eq!(outcome.result, None);
    let log = log.lock().expect("event log");
    assert_eq!(*log, vec!["request", "malformed", "response"]);
}

#[tokio::test]
async fn when_no_envelope_key_matches_whole_result_is_returned() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(
        r#"{"count":{"value":4},"next_page":null}"#,
    ))]);
    let client = client_with(token_config(), http);

    let outcome = client.views().show_count(1).await.expect("should succeed");

    assert_eq!(outcome.body, json!({"count": {"value": 4}, "next_page": null}));
}

#[tokio::test]
async fn when_views_and_tickets_are_both_present_views_win() {
    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(
        r#"{"views":[{"id":1}],"tickets":[{"id":99}]}"#,
    ))]);
    let client = client_with(token_config(), http);

    let outcome = client.views().show(1).await.expect("should succeed");

    assert_eq!(outcome.body, json!([{"id": 1}]));
}

// =============================================================================
// Failure reporting
// =============================================================================

#[tokio::test]
async fn when_transport_fails_error_is_returned_and_reported_twice() {
    // Given: A transport that cannot connect
    let http = ScriptedHttpClient::new(vec![Err(HttpError::new("connection failed: refused"))]);
    let (client, log) = recording_client(http);

    // When: A request is made
    let error = client.views().show(1).await.expect_err("should fail");

    // Then: The core reports the transport error and the façade the wrapped one
    assert!(matches!(error.inner(), RequestError::Transport(_)));
    assert_eq!(
        error.to_string(),
        "zendesk error: connection failed: refused"
    );
    let log = log.lock().expect("event log");
    assert_eq!(*log, vec!["request", "transport_error", "error"]);
}

#[tokio::test]
async fn when_invalid_configuration_is_used_client_is_not_built() {
    let http = ScriptedHttpClient::new(Vec::new());
    let result = Zendesk::builder(ClientConfig::new(REMOTE, "agent"))
        .http_client(http)
        .build();

    assert!(result.is_err());
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn when_uploading_a_file_it_is_posted_without_json_headers() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"attachment bytes").expect("write fixture");

    let http = ScriptedHttpClient::new(vec![Ok(HttpResponse::new(
        201,
        br#"{"upload":{"token":"abc"}}"#.to_vec(),
    ))]);
    let client = client_with(token_config(), Arc::clone(&http));

    let outcome = client
        .resource(EnvelopeKeys::new(&["upload"]))
        .upload(
            PathSpec::segments(["uploads"]).with_query([("filename", "notes.txt")]),
            file.path(),
        )
        .await
        .expect("upload should succeed");

    assert_eq!(outcome.body, json!({"token": "abc"}));
    let request = &http.recorded_requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, format!("{REMOTE}/uploads.json?filename=notes.txt"));
    assert_eq!(request.header("content-type"), None);
    assert!(request.header("authorization").is_some());
    assert_eq!(request.body, Some(HttpBody::File(file.path().to_path_buf())));
}

#[tokio::test]
async fn when_upload_file_is_missing_nothing_is_sent() {
    let http = ScriptedHttpClient::new(Vec::new());
    let client = client_with(token_config(), Arc::clone(&http));

    let error = client
        .resource(EnvelopeKeys::none())
        .upload(
            PathSpec::segments(["uploads"]),
            std::path::Path::new("/definitely/not/here.bin"),
        )
        .await
        .expect_err("missing file should fail");

    assert!(matches!(error.inner(), RequestError::Upload { .. }));
    assert!(http.recorded_requests().is_empty());
}
