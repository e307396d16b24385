#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use super::*;
use crate::api::environments::Environment;
use mockito::Server;

fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        timeout_seconds: 5,
    }
}

#[tokio::test]
async fn client_sends_api_key_and_user_agent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/environments")
        .match_header("x-api-key", "top-secret")
        .match_header("accept", "application/json")
        .match_header(
            "user-agent",
            mockito::Matcher::Regex("^terraform-provider-bastionzero/".to_string()),
        )
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let client = Client::new(&server.url(), "top-secret").unwrap();
    let environments: Vec<Environment> = client.environments().list().await.unwrap();

    assert!(environments.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn client_strips_trailing_slash_from_endpoint() {
    let server = Server::new_async().await;
    let client = Client::new(&format!("{}/", server.url()), "secret").unwrap();
    assert_eq!(client.base_url(), format!("{}/api/v2", server.url()));
}

#[test]
fn client_rejects_invalid_endpoints() {
    assert!(matches!(
        Client::new("not a url", "secret"),
        Err(ApiError::InvalidEndpoint(_))
    ));
    assert!(matches!(
        Client::new("ftp://cloud.bastionzero.com", "secret"),
        Err(ApiError::InvalidEndpoint(_))
    ));
}

#[tokio::test]
async fn client_maps_unauthorized_to_auth_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/users")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let client = Client::with_config(&server.url(), "bad", fast_retries()).unwrap();
    let result = client.users().list().await;

    assert!(matches!(result, Err(ApiError::AuthError)));
    mock.assert_async().await;
}

#[tokio::test]
async fn client_reports_not_found_with_api_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v2/environments/missing")
        .with_status(404)
        .with_body(r#"{"errorType":"NotFound","errorMsg":"environment not found"}"#)
        .create_async()
        .await;

    let client = Client::new(&server.url(), "secret").unwrap();
    let err = client.environments().get("missing").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ApiError::ApiError { message, .. } => {
            assert_eq!(message, "NotFound: environment not found")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn client_retries_server_errors_then_gives_up() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/environments")
        .with_status(503)
        .expect(4)
        .create_async()
        .await;

    let client = Client::with_config(&server.url(), "secret", fast_retries()).unwrap();
    let result = client.environments().list().await;

    assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
    mock.assert_async().await;
}

#[tokio::test]
async fn client_retries_rate_limited_requests() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v2/service-accounts")
        .with_status(429)
        .expect(2)
        .create_async()
        .await;

    let retry = RetryConfig {
        max_retries: 1,
        ..fast_retries()
    };
    let client = Client::with_config(&server.url(), "secret", retry).unwrap();
    let result = client.service_accounts().list().await;

    assert!(matches!(result, Err(ApiError::RateLimited)));
    mock.assert_async().await;
}

#[tokio::test]
async fn client_sends_a_create_once_when_the_server_fails() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v2/environments")
        .with_status(502)
        .with_body("bad gateway")
        .expect(1)
        .create_async()
        .await;

    let client = Client::with_config(&server.url(), "secret", fast_retries()).unwrap();
    let result = client
        .post::<serde_json::Value, _>("/environments", &serde_json::json!({"name": "prod"}))
        .await;

    match result {
        Err(ApiError::ApiError { status, .. }) => assert_eq!(status, 502),
        other => panic!("unexpected result: {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn client_retries_rate_limited_creates() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v2/environments")
        .with_status(429)
        .expect(2)
        .create_async()
        .await;

    let retry = RetryConfig {
        max_retries: 1,
        ..fast_retries()
    };
    let client = Client::with_config(&server.url(), "secret", retry).unwrap();
    let result = client
        .post::<serde_json::Value, _>("/environments", &serde_json::json!({"name": "prod"}))
        .await;

    assert!(matches!(result, Err(ApiError::RateLimited)));
    mock.assert_async().await;
}

#[tokio::test]
async fn client_retries_updates_on_server_errors() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PATCH", "/api/v2/environments/env-1")
        .with_status(503)
        .expect(4)
        .create_async()
        .await;

    let client = Client::with_config(&server.url(), "secret", fast_retries()).unwrap();
    let result = client
        .patch::<serde_json::Value, _>("/environments/env-1", &serde_json::json!({}))
        .await;

    assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
    mock.assert_async().await;
}

#[tokio::test]
async fn client_does_not_retry_client_errors() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v2/environments")
        .with_status(400)
        .with_body("name is required")
        .expect(1)
        .create_async()
        .await;

    let client = Client::with_config(&server.url(), "secret", fast_retries()).unwrap();
    let result = client
        .post::<serde_json::Value, _>("/environments", &serde_json::json!({}))
        .await;

    match result {
        Err(ApiError::ApiError { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "name is required");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn client_accepts_empty_success_bodies() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/v2/environments/env-1")
        .with_status(204)
        .create_async()
        .await;

    let client = Client::new(&server.url(), "secret").unwrap();
    tokio_test::assert_ok!(client.environments().delete("env-1").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn client_reports_unparseable_bodies() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v2/environments")
        .with_body("{not json")
        .create_async()
        .await;

    let client = Client::new(&server.url(), "secret").unwrap();
    let result = client.environments().list().await;
    assert!(matches!(result, Err(ApiError::ParseError(_))));
}

#[tokio::test]
async fn client_treats_refused_connections_as_unavailable() {
    let client = Client::with_config("http://127.0.0.1:1", "secret", fast_retries()).unwrap();
    let result = client.environments().list().await;
    assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
}
