//! Request handling that is settled before any database round trip:
//! missing inputs, malformed bodies, CORS and request ids.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
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

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn searches_without_a_term_return_empty_lists() {
    let (app, _) = common::test_router().await;

    for uri in ["/search", "/search?query=", "/search2", "/search2?query="] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn lookups_without_an_id_return_empty_objects() {
    let (app, _) = common::test_router().await;

    for uri in ["/get-gene-info", "/get-gene-info?geneId=", "/get-gene-info2", "/get-gene-info2?chrid="] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!({}), "{}", uri);
    }
}

#[tokio::test]
async fn variant_search_without_text_returns_empty_list() {
    let (app, _) = common::test_router().await;

    let (status, body) = send(&app, post_json("/searchvarian", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, post_json("/searchvarian", json!({ "searchText3": "" }))).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn multi_variant_with_missing_window_returns_empty_list() {
    let (app, _) = common::test_router().await;

    let body = json!({ "selectedOption": 1, "varianstart": 10, "rightItems": ["M.a"] });
    let (status, body) = send(&app, post_json("/multivarian", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn multi_variant_rejects_non_numeric_window() {
    let (app, _) = common::test_router().await;

    let body = json!({
        "selectedOption": "chr1",
        "varianstart": 10,
        "varianend": 20,
        "rightItems": []
    });
    let (status, body) = send(&app, post_json("/multivarian", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("selectedOption"));
}

#[tokio::test]
async fn selections_without_ids_return_empty_lists() {
    let (app, _) = common::test_router().await;

    for uri in ["/transcriptome_data", "/metabolomics_data"] {
        let (status, body) = send(&app, post_json(uri, json!({ "rightitems": ["x"] }))).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);

        let (_, body) = send(&app, post_json(uri, json!({ "idlist": [] }))).await;
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn malformed_json_body_is_a_client_error() {
    let (app, _) = common::test_router().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transcriptome_data")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (app, _) = common::test_router().await;

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/multivarian")
        .header(header::ORIGIN, "http://frontend.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let request = Request::builder()
        .uri("/search")
        .header(header::ORIGIN, "http://frontend.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (app, _) = common::test_router().await;

    let request = Request::builder()
        .uri("/search")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app.oneshot(get("/search")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
