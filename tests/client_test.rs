//! HTTP contract tests for the places client.

use std::time::Duration;

use serde_json::json;
use tourism_scout::{ClientConfig, Error, PlaceSource, PlacesClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PlacesClient {
    client_with_timeout(server, Duration::from_millis(8_000))
}

fn client_with_timeout(server: &MockServer, timeout: Duration) -> PlacesClient {
    PlacesClient::with_config(ClientConfig {
        base_url: format!("{}/api", server.uri()),
        timeout,
    })
    .expect("client builds")
}

async fn mount_list(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{route}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn bare_arrays_and_envelopes_both_decode() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        "hotels",
        json!([{ "id": 1, "name": "Grand", "city": "Prishtina", "rating": "4.50" }]),
    )
    .await;
    mount_list(
        &server,
        "restaurants",
        json!({ "count": 1, "next": null, "previous": null,
                "results": [{ "id": 5, "name": "Soma", "category": "bar" }] }),
    )
    .await;
    mount_list(&server, "events", json!([])).await;

    let client = client_for(&server);
    let raw = client.fetch_all().await.expect("fetch succeeds");
    assert_eq!(raw.hotels.len(), 1);
    assert_eq!(raw.hotels[0].rating.as_deref(), Some("4.50"));
    assert_eq!(raw.restaurants.len(), 1);
    assert_eq!(raw.restaurants[0].category.as_deref(), Some("bar"));
    assert!(raw.events.is_empty());
}

#[tokio::test]
async fn sparse_records_decode_with_defaults() {
    let server = MockServer::start().await;
    mount_list(&server, "hotels", json!([{ "id": 3 }])).await;
    mount_list(&server, "restaurants", json!([])).await;
    mount_list(&server, "events", json!([{ "id": 4, "date": "2024-08-09" }])).await;

    let client = client_for(&server);
    let raw = client.fetch_all().await.expect("fetch succeeds");
    assert_eq!(raw.hotels[0].id, 3);
    assert!(raw.hotels[0].name.is_empty());
    assert_eq!(raw.events[0].date.as_deref(), Some("2024-08-09"));
}

#[tokio::test]
async fn server_error_carries_the_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hotels/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database exploded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_hotels().await.unwrap_err();
    match err {
        Error::Transport(detail) => assert!(detail.contains("database exploded")),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_events().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn envelope_without_results_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_list(&server, "restaurants", json!({ "detail": "throttled" })).await;

    let client = client_for(&server);
    let err = client.fetch_restaurants().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hotels/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_with_timeout(&server, Duration::from_millis(100));
    let err = client.fetch_hotels().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 100 }));
}

#[tokio::test]
async fn one_failing_collection_fails_the_combined_fetch() {
    let server = MockServer::start().await;
    mount_list(&server, "hotels", json!([])).await;
    mount_list(&server, "restaurants", json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/events/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_all().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
