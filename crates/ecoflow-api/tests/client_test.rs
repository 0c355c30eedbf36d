//! Integration tests for the API client against a local stub server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use ecoflow_api::{ApiError, DeviceId, EcoflowClient, Reading, ReadingOutcome, Signer};
use serde_json::{json, Value};

const ACCESS_KEY: &str = "test-access";
const SECRET_KEY: &str = "test-secret";

/// A captured request: headers of interest plus the query string.
#[derive(Debug, Clone)]
struct Captured {
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
}

#[derive(Clone)]
struct Stub {
    list: (StatusCode, String),
    quota: (StatusCode, String),
    captured: Arc<Mutex<Vec<Captured>>>,
}

fn capture(headers: &HeaderMap, query: HashMap<String, String>) -> Captured {
    let headers = ["accessKey", "nonce", "timestamp", "sign"]
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    Captured { headers, query }
}

async fn device_list(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.captured.lock().unwrap().push(capture(&headers, query));
    stub.list.clone()
}

async fn quota_all(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.captured.lock().unwrap().push(capture(&headers, query));
    stub.quota.clone()
}

/// Start a stub API and return a client pointed at it.
async fn serve(list: (StatusCode, Value), quota: (StatusCode, Value)) -> (EcoflowClient, Arc<Mutex<Vec<Captured>>>) {
    serve_raw(
        (list.0, list.1.to_string()),
        (quota.0, quota.1.to_string()),
    )
    .await
}

async fn serve_raw(list: (StatusCode, String), quota: (StatusCode, String)) -> (EcoflowClient, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        list,
        quota,
        captured: Arc::clone(&captured),
    };

    let app = Router::new()
        .route("/iot-open/sign/device/list", get(device_list))
        .route("/iot-open/sign/device/quota/all", get(quota_all))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = EcoflowClient::new(&format!("http://{}", addr), ACCESS_KEY, SECRET_KEY).unwrap();
    (client, captured)
}

fn ok(value: Value) -> (StatusCode, Value) {
    (StatusCode::OK, value)
}

#[tokio::test]
async fn test_resolve_device_returns_first_serial() {
    let (client, captured) = serve(
        ok(json!({"code": "0", "data": [{"sn": "R331ZEB4ZEAL0528", "online": 1}, {"sn": "OTHER"}]})),
        ok(json!({})),
    )
    .await;

    let device = client.resolve_device_id().await.unwrap();
    assert_eq!(device, Some(DeviceId::new("R331ZEB4ZEAL0528")));

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert!(request.query.is_empty());
    assert_eq!(request.headers["accessKey"], ACCESS_KEY);

    // The server can recompute the signature from the headers it received.
    let expected = Signer::new(ACCESS_KEY, SECRET_KEY).sign_with(
        &[],
        &request.headers["nonce"],
        &request.headers["timestamp"],
    );
    assert_eq!(request.headers["sign"], expected.sign);
}

#[tokio::test]
async fn test_resolve_device_none_when_list_empty_or_rejected() {
    let (client, _) = serve(ok(json!({"code": "0", "data": []})), ok(json!({}))).await;
    assert_eq!(client.resolve_device_id().await.unwrap(), None);

    let (client, _) = serve(
        ok(json!({"code": "8521", "message": "signature is wrong"})),
        ok(json!({})),
    )
    .await;
    assert_eq!(client.resolve_device_id().await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_reading_signs_serial_number() {
    let (client, captured) = serve(
        ok(json!({"code": "0", "data": []})),
        ok(json!({"code": "0", "data": {"cmsBattSoc": 80, "powGetSysGrid": 15, "powGetSysLoad": 0}})),
    )
    .await;

    let device = DeviceId::new("R331ZEB4ZEAL0528");
    let outcome = client.fetch_reading(&device).await.unwrap();
    assert_eq!(outcome, ReadingOutcome::Success(Reading::new(80, 15.0, 0.0)));

    let captured = captured.lock().unwrap();
    let request = &captured[0];
    assert_eq!(request.query.get("sn").map(String::as_str), Some("R331ZEB4ZEAL0528"));

    let expected = Signer::new(ACCESS_KEY, SECRET_KEY).sign_with(
        &[("sn", "R331ZEB4ZEAL0528")],
        &request.headers["nonce"],
        &request.headers["timestamp"],
    );
    assert_eq!(request.headers["sign"], expected.sign);
}

#[tokio::test]
async fn test_fetch_reading_api_failure_is_data() {
    let body = json!({"code": "6012", "message": "device offline"});
    let (client, _) = serve(ok(json!({})), ok(body.clone())).await;

    let outcome = client.fetch_reading(&DeviceId::new("SN")).await.unwrap();
    match outcome {
        ReadingOutcome::Failed(failure) => {
            assert_eq!(failure.code, "6012");
            assert_eq!(failure.message.as_deref(), Some("device offline"));
            assert_eq!(failure.payload, body);
        }
        other => panic!("expected API failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_transport_fault() {
    let (client, _) = serve_raw(
        (StatusCode::OK, "<html>gateway</html>".to_string()),
        (StatusCode::BAD_GATEWAY, "upstream down".to_string()),
    )
    .await;

    let err = client.resolve_device_id().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "got {:?}", err);

    let err = client.fetch_reading(&DeviceId::new("SN")).await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_fault() {
    // Bind and drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = EcoflowClient::new(&format!("http://{}", addr), ACCESS_KEY, SECRET_KEY).unwrap();
    let err = client.resolve_device_id().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)), "got {:?}", err);
}
