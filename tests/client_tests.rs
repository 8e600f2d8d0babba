//! Supplier API client tests against an in-process mock server

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use wb_export::api::{Attachment, CardsQuery, ClientConfig, Params, SupplierClient};
use wb_export::error::WbError;
use wb_export::types::Credentials;

// ═══════════════════════════════════════════════════════════════════════════
// MOCK SERVER
// ═══════════════════════════════════════════════════════════════════════════

fn header_map(headers: &HeaderMap) -> Value {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

async fn echo(
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    Json(json!({
        "result": {
            "query": query,
            "headers": header_map(&headers),
            "body": body,
        }
    }))
}

async fn catalog_info() -> Json<Value> {
    Json(json!({
        "result": [
            {"nmId": 1, "price": 100, "sizes": [{"s": "M"}]},
            {"nmId": 2, "price": 200, "sizes": []}
        ]
    }))
}

async fn orders(Query(query): Query<HashMap<String, String>>, headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "result": [{
            "dateFrom": query.get("dateFrom"),
            "flag": query.get("flag"),
            "key": query.get("key"),
            "auth": headers.get("authorization").and_then(|v| v.to_str().ok()),
        }]
    }))
}

async fn sales_without_wrapper() -> Json<Value> {
    Json(json!({"data": []}))
}

async fn cards_list(body: String) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Json(json!({
        "data": {"cards": [{"imtID": 10, "sort": request["sort"].clone()}]},
        "error": false
    }))
}

async fn card_by_imt(body: String) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Json(json!({"result": {"card": {"imtID": request["imtID"].clone()}}}))
}

async fn barcodes(body: String) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let quantity = request["quantity"].as_u64().unwrap_or(0);
    let codes: Vec<String> = (0..quantity).map(|i| format!("20000000000{}", i)).collect();
    Json(json!({"result": {"barcodes": codes}}))
}

async fn delete_nomenclature(body: String) -> Json<Value> {
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Json(json!({"error": false, "deleted": request["nomenclatureID"].clone()}))
}

async fn unauthorized() -> (StatusCode, &'static str) {
    (StatusCode::UNAUTHORIZED, "invalid token")
}

async fn bad_request() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, r#"{"error":true,"errorText":"bad body"}"#)
}

async fn not_json() -> &'static str {
    "<html>maintenance</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"result": []}))
}

fn router() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo))
        .route("/public/api/v1/info", get(catalog_info))
        .route("/api/v1/supplier/orders", get(orders))
        .route("/api/v1/supplier/sales", get(sales_without_wrapper))
        .route("/content/v1/cards/list", post(cards_list))
        .route("/card/cardByImtID", post(card_by_imt))
        .route("/card/getBarcodes", post(barcodes))
        .route("/card/deleteNomenclature", post(delete_nomenclature))
        .route("/fail", get(unauthorized).post(bad_request))
        .route("/not-json", get(not_json))
        .route("/slow", get(slow))
}

/// Serve the mock API on a random local port from a background thread.
fn spawn_server() -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router()).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn client_for(base_url: &str) -> SupplierClient {
    let config = ClientConfig::new(Credentials::new("TOKEN", "K")).with_base_url(base_url);
    SupplierClient::new(config).unwrap()
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GET / POST TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_get_sends_default_auth() {
    let client = client_for(&spawn_server());
    let reply = client.get("/echo", None, None).unwrap();

    assert_eq!(reply["result"]["query"], json!({"key": "K"}));
    assert_eq!(reply["result"]["headers"]["authorization"], "TOKEN");
    assert_eq!(reply["result"]["headers"]["content-type"], "application/json");
}

#[test]
fn test_get_merges_call_params() {
    let client = client_for(&spawn_server());
    let call = params(json!({"dateFrom": "2023-01-01"}));
    let reply = client.get("/echo", Some(&call), None).unwrap();

    assert_eq!(
        reply["result"]["query"],
        json!({"key": "K", "dateFrom": "2023-01-01"})
    );
}

#[test]
fn test_call_params_and_headers_override_defaults() {
    let client = client_for(&spawn_server());
    let call = params(json!({"key": "override"}));
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("OTHER"));

    let reply = client.get("echo", Some(&call), Some(&headers)).unwrap();

    assert_eq!(reply["result"]["query"], json!({"key": "override"}));
    assert_eq!(reply["result"]["headers"]["authorization"], "OTHER");
}

#[test]
fn test_post_sends_json_body() {
    let client = client_for(&spawn_server());
    let data = json!({"sort": {"limit": 1}});
    let reply = client.post("/echo", None, Some(&data), None, None).unwrap();

    let body: Value = serde_json::from_str(reply["result"]["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, data);
    assert_eq!(reply["result"]["query"]["key"], "K");
}

#[test]
fn test_post_without_data_sends_empty_body() {
    let client = client_for(&spawn_server());
    let reply = client.post("/echo", None, None, None, None).unwrap();
    assert_eq!(reply["result"]["body"], "");
}

#[test]
fn test_post_with_files_is_multipart() {
    let client = client_for(&spawn_server());
    let files = [Attachment {
        field: "uploadfile".to_string(),
        file_name: "photo.txt".to_string(),
        bytes: b"file-content".to_vec(),
        mime: Some("text/plain".to_string()),
    }];
    let data = json!({"vendorCode": "A1"});
    let reply = client
        .post("/echo", None, Some(&data), Some(&files), None)
        .unwrap();

    let content_type = reply["result"]["headers"]["content-type"].as_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = reply["result"]["body"].as_str().unwrap();
    assert!(body.contains("file-content"));
    assert!(body.contains(r#"{"vendorCode":"A1"}"#));
}

#[test]
fn test_get_error_status_is_request_error() {
    let client = client_for(&spawn_server());
    let err = client.get("/fail", None, None).unwrap_err();
    match err {
        WbError::Request { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_post_error_status_is_request_error() {
    let client = client_for(&spawn_server());
    let err = client.post("/fail", None, None, None, None).unwrap_err();
    assert!(matches!(err, WbError::Request { status: 400, ref body } if body.contains("bad body")));
}

#[test]
fn test_non_json_body_is_json_error() {
    let client = client_for(&spawn_server());
    let err = client.get("/not-json", None, None).unwrap_err();
    assert!(matches!(err, WbError::Json(_)));
}

#[test]
fn test_slow_server_times_out() {
    let base = spawn_server();
    let config = ClientConfig::new(Credentials::new("TOKEN", "K"))
        .with_base_url(base)
        .with_timeout(Duration::from_millis(200));
    let client = SupplierClient::new(config).unwrap();

    let err = client.get("/slow", None, None).unwrap_err();
    match err {
        WbError::Timeout(url) => {
            assert!(url.ends_with("/slow"));
            assert!(!url.contains("key="), "API key leaked into error: {url}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unreachable_server_is_transport_error() {
    let client = client_for("http://127.0.0.1:1");
    let err = client.get("/echo", None, None).unwrap_err();
    assert!(matches!(err, WbError::Transport(_) | WbError::Timeout(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_get_catalog_info_unwraps_result() {
    let client = client_for(&spawn_server());
    let records = client.get_catalog_info().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["nmId"], json!(1));
    assert_eq!(records[1]["sizes"], json!([]));
    let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["nmId", "price", "sizes"]);
}

#[test]
fn test_get_orders_sends_date_and_flag() {
    let client = client_for(&spawn_server());
    let date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let records = client.get_orders(date, 1).unwrap();

    assert_eq!(records[0]["dateFrom"], "2023-01-01");
    assert_eq!(records[0]["flag"], "1");
    assert_eq!(records[0]["key"], "K");
    assert_eq!(records[0]["auth"], "TOKEN");
}

#[test]
fn test_get_sales_missing_wrapper_is_shape_error() {
    let client = client_for(&spawn_server());
    let date = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let err = client.get_sales(date, 0).unwrap_err();
    assert!(matches!(err, WbError::ResponseShape(path) if path == "result"));
}

#[test]
fn test_list_cards_posts_sort_settings() {
    let client = client_for(&spawn_server());
    let query = CardsQuery {
        limit: 10,
        search_value: "dress".to_string(),
        ascending: false,
        ..CardsQuery::default()
    };
    let cards = client.list_cards(&query).unwrap();

    assert_eq!(cards.len(), 1);
    assert_eq!(
        cards[0]["sort"],
        json!({
            "limit": 10,
            "offset": 0,
            "searchValue": "dress",
            "sortColumn": "updateAt",
            "ascending": false
        })
    );
}

#[test]
fn test_get_card_by_group_id() {
    let client = client_for(&spawn_server());
    let card = client.get_card_by_group_id(12345).unwrap();
    assert_eq!(card, json!({"card": {"imtID": 12345}}));
}

#[test]
fn test_generate_barcodes() {
    let client = client_for(&spawn_server());
    let codes = client.generate_barcodes(3).unwrap();
    assert_eq!(codes.len(), 3);
    assert_eq!(codes[0], "200000000000");
}

#[test]
fn test_delete_item_returns_whole_reply() {
    let client = client_for(&spawn_server());
    let reply = client.delete_item(77).unwrap();
    assert_eq!(reply, json!({"error": false, "deleted": 77}));
}

#[test]
fn test_client_config_defaults() {
    let config = ClientConfig::new(Credentials::new("T", "K"));
    assert_eq!(config.base_url, wb_export::api::DEFAULT_BASE_URL);
    assert_eq!(config.timeout, Duration::from_secs(30));

    let client = SupplierClient::new(config).unwrap();
    assert_eq!(client.default_headers()[CONTENT_TYPE], "application/json");
    assert_eq!(Value::Object(client.default_params()), json!({"key": "K"}));
}
