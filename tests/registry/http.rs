//! HttpFetcher against a local axum server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use store_registry::{
    FetchError, Fetcher, HttpFetcher, InMemoryKeyValueStore, RemoteEndpoints,
    RemoteStoreSynchronizer,
};

use crate::support::memory_registry;

/// The primary API is down; the site itself still serves the static copies.
fn storefront() -> Router {
    Router::new()
        .route(
            "/api/assets/stores/index.json",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/assets/stores/index.json",
            get(|| async { Json(json!({ "stores": [{ "slug": "delta" }] })) }),
        )
        .route(
            "/assets/delta-store/store.json",
            get(|| async {
                Json(json!({
                    "slug": "delta-store",
                    "nameAr": "دلتا ستور",
                    "nameEn": "Delta Store",
                    "logo": "/assets/delta-store/logo.webp",
                    "sliders": [{ "image": "/assets/delta-store/slider1.webp" }],
                }))
            }),
        )
        .route("/broken.json", get(|| async { "not json" }))
}

/// Bind to port 0 and return the actual address.
async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, storefront()).await.unwrap();
    });
    format!("http://{addr}")
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn sync_over_http_falls_back_to_site_copy() {
    let base = start_server().await;
    let store = InMemoryKeyValueStore::new();
    let registry = memory_registry(&store);
    registry.bootstrap();

    let endpoints = RemoteEndpoints::new(&format!("{base}/api")).with_fallback(&base);
    let sync = RemoteStoreSynchronizer::new(registry.clone(), Arc::new(fetcher()), endpoints);

    let report = sync.sync().await;

    assert_eq!(
        report.directory_url,
        Some(format!("{base}/assets/stores/index.json"))
    );
    assert_eq!(report.registered, 1);
    assert_eq!(report.detail_misses, 0);

    let delta = registry.get("delta").unwrap();
    assert_eq!(delta.name_latin, "Delta Store");
    assert_eq!(
        delta.logo,
        Some(format!("{base}/assets/delta-store/logo.webp"))
    );
    assert_eq!(delta.catalog.slider_images.len(), 1);
    assert!(delta.password.is_some());
    assert_eq!(registry.len(), 5);
}

#[tokio::test]
async fn error_statuses_and_bad_bodies_are_fetch_errors() {
    let base = start_server().await;
    let fetcher = fetcher();

    let status = fetcher
        .fetch_json(&format!("{base}/api/assets/stores/index.json"))
        .await
        .unwrap_err();
    assert!(matches!(status, FetchError::Status { status: 500, .. }));

    let missing = fetcher
        .fetch_json(&format!("{base}/nowhere.json"))
        .await
        .unwrap_err();
    assert!(matches!(missing, FetchError::Status { status: 404, .. }));

    let decode = fetcher
        .fetch_json(&format!("{base}/broken.json"))
        .await
        .unwrap_err();
    assert!(matches!(decode, FetchError::Decode { .. }));
}

#[tokio::test]
async fn relative_urls_need_a_site_origin() {
    let base = start_server().await;

    let error = fetcher()
        .fetch_json("/assets/stores/index.json")
        .await
        .unwrap_err();
    assert!(matches!(error, FetchError::Transport { .. }));

    let index = fetcher()
        .with_site_origin(&base)
        .fetch_json("/assets/stores/index.json")
        .await
        .unwrap();
    assert_eq!(index["stores"][0]["slug"], "delta");
}
