//! Control-plane tests driven through the router.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use annoying_client::config::Config;
use annoying_client::traffic::SelectionKind;
use annoying_client::{App, HttpServer};

fn test_app() -> (App, Router) {
    let config = Config {
        base_url: "http://127.0.0.1:9/".to_string(),
        interval: 60_000,
        ..Config::default()
    };
    let app = App::new(config, false);
    let router = HttpServer::build_router(app.state());
    (app, router)
}

fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
}

fn put_config(auth: Option<String>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri("/config")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_stats_served_on_any_path() {
    let (app, router) = test_app();
    app.stats.record_attempt(SelectionKind::Index, "http://127.0.0.1:9/", None);
    app.stats.record_outcome(true, Some(200));

    for (method, uri) in [("GET", "/"), ("GET", "/config"), ("POST", "/anything/else")] {
        let response = router
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} {}", method, uri);

        let doc = json_body(response).await;
        assert_eq!(doc["req"]["index"], 1);
        assert_eq!(doc["req"]["statuses"]["200"], 1);
        assert_eq!(doc["res"], json!({ "success": 1, "fail": 0 }));
    }
}

#[tokio::test]
async fn test_put_without_credentials_is_challenged() {
    let (app, router) = test_app();

    let response = router
        .oneshot(put_config(None, json!({ "parallel": 20 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"Annoying Client Auth\""
    );
    assert_eq!(app.store.current().parallel, 10);
}

#[tokio::test]
async fn test_put_with_wrong_password_changes_nothing() {
    let (app, router) = test_app();

    let response = router
        .oneshot(put_config(Some(basic("annoying", "wrong")), json!({ "parallel": 20 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.current().parallel, 10);
}

#[tokio::test]
async fn test_put_merges_and_echoes_without_secrets() {
    let (app, router) = test_app();
    app.scheduler.start().await;

    let response = router
        .oneshot(put_config(
            Some(basic("annoying", "test")),
            json!({
                "parallel": 20,
                "clientAuth": { "username": "annoying", "password": "plaintext" },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = json_body(response).await;
    assert_eq!(doc["parallel"], 20);
    assert_eq!(doc["otherUris"], json!(["/foo", "/bar"]));
    assert_eq!(doc["interval"], 60_000);
    assert!(doc.get("password").is_none());
    assert!(doc.get("clientAuth").is_none());

    assert_eq!(doc, app.store.public_view());

    let current = app.store.current();
    assert_eq!(current.parallel, 20);
    assert!(current.client_auth.is_some());

    app.scheduler.stop().await;
}

#[tokio::test]
async fn test_invalid_update_rejected() {
    let (app, router) = test_app();

    let response = router
        .oneshot(put_config(Some(basic("annoying", "test")), json!({ "indexPct": 0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let doc = json_body(response).await;
    assert!(doc["error"].as_str().unwrap().contains("indexPct"));
    assert_eq!(app.store.current().index_pct, 60);
}

#[tokio::test]
async fn test_non_object_body_rejected() {
    let (_app, router) = test_app();

    let response = router
        .oneshot(put_config(Some(basic("annoying", "test")), json!([1, 2, 3])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_without_json_content_type_rejected() {
    let (app, router) = test_app();

    let request = Request::builder()
        .method("PUT")
        .uri("/config")
        .header(header::AUTHORIZATION, basic("annoying", "test"))
        .body(Body::from(json!({ "parallel": 20 }).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.store.current().parallel, 10);
}

#[tokio::test]
async fn test_counters_survive_reconfiguration() {
    let (app, router) = test_app();
    app.stats.record_attempt(SelectionKind::Other, "http://127.0.0.1:9/foo", None);
    app.stats.record_outcome(false, None);

    let response = router
        .clone()
        .oneshot(put_config(Some(basic("annoying", "test")), json!({ "interval": 30_000 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let doc = json_body(response).await;
    assert_eq!(doc["req"]["other"], 1);
    assert_eq!(doc["req"]["statuses"]["error"], 1);
    assert_eq!(doc["res"]["fail"], 1);
}

#[tokio::test]
async fn test_repeated_logins_reuse_cached_hash() {
    let (app, router) = test_app();

    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(put_config(Some(basic("annoying", "test")), json!({ "parallel": 5 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.authorizer.cache_misses(), 1);
    assert_eq!(app.authorizer.cache_hits(), 2);
}
