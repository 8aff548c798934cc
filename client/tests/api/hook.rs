use std::rc::Rc;
use std::time::Duration;

use client::{APIClient, ClientError, RequestConfig, RequestHook};
use reqwest::StatusCode;
use serde_json::{Value, json};
use test_helpers::{spawn_app, unreachable_address};

const SLOW: Duration = Duration::from_millis(300);

#[tokio::test]
async fn loading_as_soon_as_invocation_starts() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/test-url", 200, json!({"data": "test"}));
    let hook = app.hook::<Value>("/test-url", RequestConfig::get());

    // A previous success must not leak into the next loading state.
    hook.invoke().await;
    assert!(hook.snapshot().data().is_some());

    app.respond_with_delay("/test-url", 200, json!({"data": "again"}), SLOW);
    tokio::join!(hook.invoke(), async {
        tokio::task::yield_now().await;
        let current = hook.current();
        assert!(current.loading);
        assert!(current.data.is_none());
        assert!(current.error.is_none());
    });

    assert_eq!(hook.snapshot().data(), Some(&json!({"data": "again"})));
    Ok(())
}

#[tokio::test]
async fn success_sets_data() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/test-url", 200, json!({"data": "test"}));
    let hook = app.hook::<Value>("/test-url", RequestConfig::default());

    hook.invoke().await;

    let current = hook.current();
    assert_eq!(current.data, Some(json!({"data": "test"})));
    assert!(current.error.is_none());
    assert!(!current.loading);

    let requests = app.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/test-url");
    Ok(())
}

#[tokio::test]
async fn unprocessable_entity_sets_validation_error() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/test-url", 422, json!({"message": "Fetch error"}));
    let hook = app.hook::<Value>("/test-url", RequestConfig::get());

    hook.invoke().await;

    let current = hook.current();
    assert!(current.data.is_none());
    assert!(!current.loading);
    let error = current.error.expect("error should be set");
    assert!(matches!(error, ClientError::Validation { .. }));
    assert_eq!(error.status(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert_eq!(error.message(), "Fetch error");
    assert!(error.to_string().contains("Fetch error"));
    Ok(())
}

#[tokio::test]
async fn other_failures_combine_status_text_and_message() -> anyhow::Result<()>
{
    let app = spawn_app().await;
    app.respond_with("/boom", 500, json!({"message": "Internal server error"}));
    app.respond_with("/gone", 404, json!({"detail": "Sensor not found"}));
    app.respond_with("/bare", 503, json!({}));
    app.respond_with_raw("/html", 502, "<html>bad gateway</html>");

    let cases = [
        ("/boom", "Internal Server Error: Internal server error"),
        ("/gone", "Not Found: Sensor not found"),
        ("/bare", "Service Unavailable: Unknown error"),
        ("/html", "Bad Gateway: Unknown error"),
    ];
    for (path, expected) in cases {
        let hook = app.hook::<Value>(path, RequestConfig::get());
        hook.invoke().await;

        let snapshot = hook.snapshot();
        assert!(snapshot.data().is_none());
        assert!(!snapshot.is_loading());
        let error = snapshot.error().expect("error should be set");
        assert!(matches!(error, ClientError::Request { .. }));
        assert_eq!(error.to_string(), expected);
    }
    Ok(())
}

#[tokio::test]
async fn empty_success_body_is_a_failure() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with_raw("/empty", 200, "");
    let hook = app.hook::<Value>("/empty", RequestConfig::get());

    hook.invoke().await;

    let error = hook.snapshot().error().cloned().expect("error should be set");
    assert_eq!(error.status(), Some(StatusCode::OK));
    assert!(error.to_string().contains("Invalid response body"));
    Ok(())
}

#[tokio::test]
async fn network_failure_sets_error() -> anyhow::Result<()> {
    let api_client = Rc::new(APIClient::new(unreachable_address()));
    let hook =
        RequestHook::<Value>::new(api_client, "/test-url", RequestConfig::get());

    hook.invoke().await;

    let current = hook.current();
    assert!(current.data.is_none());
    assert!(!current.loading);
    let error = current.error.expect("error should be set");
    assert!(matches!(error, ClientError::Network(_)));
    assert_eq!(error.status(), None);
    Ok(())
}

#[tokio::test]
async fn rerender_with_same_request_does_not_resend() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/test-url", 200, json!({}));
    let mut hook = app.hook::<Value>("/test-url", RequestConfig::get());

    assert!(hook.invoke_on_change("/test-url", RequestConfig::get()).await);
    assert_eq!(app.request_count(), 1);

    let invoker = hook.invoker();
    assert!(!hook.invoke_on_change("/test-url", RequestConfig::get()).await);
    assert!(
        !hook
            .invoke_on_change("/test-url", RequestConfig::new("get"))
            .await
    );
    assert_eq!(app.request_count(), 1);
    assert_eq!(invoker, hook.invoker());

    // Calling the invoker explicitly still goes to the network.
    invoker.invoke().await;
    assert_eq!(app.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn rerender_with_new_request_sends_once_per_change() -> anyhow::Result<()>
{
    let app = spawn_app().await;
    app.respond_with("/test-url", 200, json!({"page": 1}));
    app.respond_with("/new-url", 200, json!({"page": 2}));
    let mut hook = app.hook::<Value>("/test-url", RequestConfig::get());

    hook.invoke_on_change("/test-url", RequestConfig::get()).await;
    assert_eq!(app.request_count(), 1);

    assert!(hook.invoke_on_change("/new-url", RequestConfig::get()).await);
    assert!(!hook.invoke_on_change("/new-url", RequestConfig::get()).await);
    assert_eq!(app.request_count(), 2);
    assert_eq!(hook.snapshot().data(), Some(&json!({"page": 2})));

    let traced = RequestConfig::get().header("x-trace", "abc");
    assert!(hook.invoke_on_change("/new-url", traced.clone()).await);
    assert!(!hook.invoke_on_change("/new-url", traced).await);
    assert_eq!(app.requests_to("/new-url"), 2);
    assert_eq!(app.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn method_headers_and_body_are_sent() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/echo", 201, json!({"ok": true}));
    let config = RequestConfig::new("put")
        .header("X-Request-Id", "42")
        .json(&json!({"id": 1, "name": "kiln", "value": 0.5}))?;
    let hook = app.hook::<Value>("/echo", config);

    hook.invoke().await;

    assert_eq!(hook.snapshot().data(), Some(&json!({"ok": true})));
    let requests = app.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(
        requests[0].headers.get("x-request-id").map(String::as_str),
        Some("42")
    );
    assert_eq!(
        requests[0].headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    Ok(())
}

#[tokio::test]
async fn overlapping_invocations_both_run() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with_delay("/test-url", 200, json!({"data": "test"}), SLOW);
    let hook = app.hook::<Value>("/test-url", RequestConfig::get());

    tokio::join!(hook.invoke(), hook.invoke());

    assert_eq!(app.request_count(), 2);
    assert_eq!(hook.snapshot().data(), Some(&json!({"data": "test"})));
    Ok(())
}

#[tokio::test]
async fn last_completion_wins() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with_delay("/slow", 200, json!({"n": 1}), SLOW);
    app.respond_with("/fast", 200, json!({"n": 2}));
    let mut hook = app.hook::<Value>("/slow", RequestConfig::get());
    let slow = hook.invoker();
    hook.render("/fast", RequestConfig::get());
    let fast = hook.invoker();

    tokio::join!(slow.invoke(), fast.invoke());

    assert_eq!(hook.snapshot().data(), Some(&json!({"n": 1})));
    Ok(())
}

#[tokio::test]
async fn failure_is_recoverable_by_invoking_again() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with("/flaky", 500, json!({"message": "try later"}));
    let hook = app.hook::<Value>("/flaky", RequestConfig::get());

    hook.invoke().await;
    assert!(hook.snapshot().error().is_some());

    app.respond_with("/flaky", 200, json!([1, 2, 3]));
    hook.invoke().await;

    let current = hook.current();
    assert_eq!(current.data, Some(json!([1, 2, 3])));
    assert!(current.error.is_none());
    Ok(())
}

#[tokio::test]
async fn dropping_the_hook_mid_flight_is_harmless() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.respond_with_delay("/test-url", 200, json!({"data": "late"}), SLOW);
    let hook = app.hook::<Value>("/test-url", RequestConfig::get());
    let invoker = hook.invoker();

    drop(hook);
    invoker.invoke().await;

    assert_eq!(app.request_count(), 1);
    Ok(())
}
