//! Scanner 客户端集成测试
//!
//! 使用 wiremock 模拟上游，覆盖错误归一化与 ping 的两阶段行为

use scanner_admin::error::{AdminError, NetworkError, ScannerError};
use scanner_admin::scanner::{KeyType, PingErrorType, ScannerClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ScannerClient {
    ScannerClient::new(&server.uri(), "sk-test", 5)
}

#[tokio::test]
async fn fetch_key_assets_passes_through_upstream_json() {
    let server = MockServer::start().await;
    let body = json!({
        "items": [{"key": "k1", "recheck_status": "billable"}],
        "total": 1,
    });

    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .and(query_param("type", "valid"))
        .and(query_param("limit", "50"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch_key_assets(50, KeyType::Valid)
        .await
        .expect("fetch key assets");
    assert_eq!(result, body);
}

#[tokio::test]
async fn fetch_key_assets_requires_api_key_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = ScannerClient::new(&server.uri(), "", 5);
    let err = client
        .fetch_key_assets(10, KeyType::Valid)
        .await
        .expect_err("should fail without api key");
    assert!(matches!(
        err,
        AdminError::Scanner(ScannerError::MissingApiKey)
    ));
}

#[tokio::test]
async fn upstream_error_status_and_body_are_mirrored() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_key_assets(10, KeyType::Valid)
        .await
        .expect_err("should mirror upstream error");
    match err {
        AdminError::Scanner(ScannerError::ApiError { status, detail }) => {
            assert_eq!(status, 503);
            assert_eq!(detail, "overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_error_body_falls_back_to_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/gemini/delete-invalid"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_invalid(10)
        .await
        .expect_err("should fail");
    match err {
        AdminError::Scanner(ScannerError::ApiError { status, detail }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_maps_to_upstream_unreachable() {
    // 没有监听者的端口，连接会立即被拒绝
    let client = ScannerClient::new("http://127.0.0.1:1", "sk-test", 2);
    let err = client
        .fetch_key_assets(10, KeyType::Valid)
        .await
        .expect_err("should be unreachable");
    assert!(matches!(
        err,
        AdminError::Network(NetworkError::UpstreamUnreachable(_))
    ));
}

#[tokio::test]
async fn reverify_sends_count_and_joined_status_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/gemini/reverify"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "count": 25,
            "filter_by_status": "pending,rate_limited",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queued": 25})))
        .expect(1)
        .mount(&server)
        .await;

    let statuses = vec!["pending".to_string(), "rate_limited".to_string()];
    let result = client_for(&server)
        .trigger_reverify(25, Some(&statuses))
        .await
        .expect("trigger reverify");
    assert_eq!(result, json!({"queued": 25}));
}

#[tokio::test]
async fn reverify_omits_filter_when_statuses_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/gemini/reverify"))
        .and(body_json(json!({ "count": 50 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queued": 50})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .trigger_reverify(50, Some(&[]))
        .await
        .expect("trigger reverify");
}

#[tokio::test]
async fn delete_invalid_sends_limit_as_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/gemini/delete-invalid"))
        .and(body_json(json!({ "count": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .delete_invalid(7)
        .await
        .expect("delete invalid");
    assert_eq!(result, json!({"deleted": 7}));
}

#[tokio::test]
async fn ping_reports_connectivity_failure_and_skips_auth_stage() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    // 健康检查失败时绝不能发起授权调用
    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client_for(&server).ping().await.expect("ping");
    assert!(!result.connectivity);
    assert!(!result.auth);
    assert_eq!(result.error_type, Some(PingErrorType::Connectivity));
}

#[tokio::test]
async fn ping_reports_auth_failure_on_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client_for(&server).ping().await.expect("ping");
    assert!(result.connectivity);
    assert!(!result.auth);
    assert_eq!(result.error_type, Some(PingErrorType::Auth));
    assert_eq!(result.message.as_deref(), Some("scanner API Key 无效"));
}

#[tokio::test]
async fn ping_reports_scanner_error_with_body_as_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = client_for(&server).ping().await.expect("ping");
    assert!(result.connectivity);
    assert!(!result.auth);
    assert_eq!(result.error_type, Some(PingErrorType::ScannerError));
    assert_eq!(result.message.as_deref(), Some("maintenance"));
}

#[tokio::test]
async fn ping_succeeds_when_both_stages_pass() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthz"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/gemini/key-assets"))
        .and(query_param("type", "valid"))
        .and(query_param("limit", "1"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [], "total": 0})),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).ping().await.expect("ping");
    assert!(result.connectivity);
    assert!(result.auth);
    assert_eq!(result.message, None);
    assert_eq!(result.error_type, None);
}
