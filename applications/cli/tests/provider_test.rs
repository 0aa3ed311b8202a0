//! HTTP catalog provider tests against a mock server

use std::time::Duration;
use strawberry_cli::HttpCatalogProvider;
use strawberry_playback::{load_catalog, CatalogProvider, PlaybackError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> HttpCatalogProvider {
    HttpCatalogProvider::new(format!("{}/api/tracks", server.uri()), Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_fetches_api_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "count": 1,
            "tracks": [{
                "id": 1,
                "title": "Sunrise",
                "artist": "Berry",
                "album": "Unknown Album",
                "duration": 0,
                "cover": "https://covers/1.jpg",
                "src": "https://blob/sunrise.mp3"
            }]
        })))
        .mount(&server)
        .await;

    let tracks = provider(&server).get_catalog().await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Sunrise");
    assert_eq!(tracks[0].media_url, "https://blob/sunrise.mp3");
}

#[tokio::test]
async fn test_http_error_is_catalog_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = provider(&server).get_catalog().await;

    match result {
        Err(PlaybackError::CatalogUnavailable(message)) => assert!(message.contains("500")),
        other => panic!("expected CatalogUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_catalog_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "count": 0,
            "tracks": []
        })))
        .mount(&server)
        .await;

    let load = load_catalog(&provider(&server)).await;

    assert!(load.using_fallback);
    assert!(load.error.is_none());
    assert_eq!(load.tracks.len(), 6);
}
