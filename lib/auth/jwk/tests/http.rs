//! Integration tests for fetching key sets over HTTP.
//!
//! These tests spin up a lightweight axum server serving a key set endpoint, then verify tokens
//! signed with keys from that endpoint.
#![cfg(feature = "http")]

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use common::*;
use futures::future::join_all;
use jwk_auth::Auth0Verifier;
use jwk_auth::keyresolver::JwksResolver;
use jwk_auth::keysource::{HttpKeySource, KeySetSource as _};
use serde_json::Value;
use specifications::TokenVerifier as _;


/// What the mock endpoint answers with.
#[derive(Clone)]
enum Reply {
    Keys(Value),
    Status(StatusCode),
    Garbage,
}

/// Spins up a mock key set endpoint, returning its URL and a counter of requests served.
async fn start_jwks_server(reply: Reply, delay: Duration) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let reply = reply.clone();
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                let res: Response = match reply {
                    Reply::Keys(keys) => axum::Json(keys).into_response(),
                    Reply::Status(status) => (status, "nope").into_response(),
                    Reply::Garbage => "definitely not a key set".into_response(),
                };
                res
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/.well-known/jwks.json"), hits)
}

fn http_verifier(url: &str) -> Auth0Verifier<JwksResolver<HttpKeySource>> {
    Auth0Verifier::new(config(), JwksResolver::new(HttpKeySource::new(url).unwrap()))
}


#[tokio::test]
async fn test_from_config_targets_well_known_endpoint() {
    let verifier = Auth0Verifier::from_config(config()).unwrap();
    assert_eq!(verifier.resolver().source().url(), "https://example.auth0.com/.well-known/jwks.json");
}

#[tokio::test]
async fn test_fetches_and_caches_key_set() {
    let (url, hits) = start_jwks_server(Reply::Keys(key_set_json(&[public_jwk(1)])), Duration::ZERO).await;
    let verifier = http_verifier(&url);

    let token = sign(&valid_claims());
    for _ in 0..3 {
        let principal = verifier.verify(&token).await.expect("Expected token to be accepted");
        assert_eq!(principal.client_id, "client1");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verifications_share_one_request() {
    let (url, hits) = start_jwks_server(Reply::Keys(key_set_json(&[public_jwk(1)])), Duration::from_millis(100)).await;
    let verifier = Arc::new(http_verifier(&url));
    let token = sign(&valid_claims());

    let results = join_all((0..16).map(|_| {
        let verifier = verifier.clone();
        let token = token.clone();
        tokio::spawn(async move { verifier.verify(&token).await })
    }))
    .await;
    assert!(results.into_iter().all(|res| res.unwrap().is_some()));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_status_is_rejection() {
    let (url, _) = start_jwks_server(Reply::Status(StatusCode::INTERNAL_SERVER_ERROR), Duration::ZERO).await;
    assert!(HttpKeySource::new(&url).unwrap().fetch().await.is_err());
    assert!(http_verifier(&url).verify(&sign(&valid_claims())).await.is_none());
}

#[tokio::test]
async fn test_malformed_key_set_is_rejection() {
    let (url, _) = start_jwks_server(Reply::Garbage, Duration::ZERO).await;
    assert!(http_verifier(&url).verify(&sign(&valid_claims())).await.is_none());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_rejection() {
    // Grab a free port, then make sure nobody listens on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/.well-known/jwks.json");
    assert!(http_verifier(&url).verify(&sign(&valid_claims())).await.is_none());
}

#[tokio::test]
async fn test_slow_endpoint_is_rejection() {
    let (url, _) = start_jwks_server(Reply::Keys(key_set_json(&[public_jwk(1)])), Duration::from_secs(5)).await;

    // Either timeout suffices on its own
    let source = HttpKeySource::with_timeout(&url, Duration::from_millis(100)).unwrap();
    let verifier = Auth0Verifier::new(config(), JwksResolver::new(source));
    assert!(verifier.verify(&sign(&valid_claims())).await.is_none());

    let resolver = JwksResolver::new(HttpKeySource::new(&url).unwrap()).with_fetch_timeout(Duration::from_millis(100));
    let verifier = Auth0Verifier::new(config(), resolver);
    assert!(verifier.verify(&sign(&valid_claims())).await.is_none());
}
