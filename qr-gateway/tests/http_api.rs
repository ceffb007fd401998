//! HTTP 表面集成测试
//!
//! 通过 tower oneshot 驱动完整的 axum 应用，覆盖路由、
//! extractor 和错误信封，不真正绑定端口。

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use qr_gateway::api::build_app;
use qr_gateway::{Config, ServerState, TokenConfig};

fn test_state() -> ServerState {
    ServerState::initialize(&Config {
        http_port: 0,
        session_ttl_secs: 600,
        sweep_interval_secs: 60,
        notify_timeout_ms: 200,
        token: TokenConfig {
            secret: "http-api-test-secret-0123456789-0123456789!!".to_string(),
        },
        environment: "development".to_string(),
    })
}

async fn send_json(app: &Router, method: &str, uri: &str, bearer: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_app(test_state());
    let (status, body) = get_json(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let app = build_app(test_state());

    // 1. 员工为桌台签发 QR 令牌
    let (status, issued) = send_json(
        &app,
        "POST",
        "/api/staff/qr/issue",
        None,
        json!({ "restaurant_id": "rest_1", "table_id": "table_7" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let qr_token = issued["qr_token"].as_str().unwrap().to_string();

    // 2. 访客扫码兑换
    let (status, redeemed) = send_json(
        &app,
        "POST",
        "/api/guest/redeem",
        None,
        json!({ "qr_token": qr_token, "table_name": "T7" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = redeemed["access_token"].as_str().unwrap().to_string();
    let session_id = redeemed["session"]["id"].as_str().unwrap().to_string();
    assert_eq!(redeemed["session"]["status"], "active");

    // 3. 凭访问令牌查看会话
    let request = Request::builder()
        .uri("/api/guest/session")
        .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 4. 提交订单
    let (status, submitted) = send_json(
        &app,
        "POST",
        "/api/guest/orders",
        Some(&access_token),
        json!({
            "client_request_id": "http-1",
            "items": [
                { "product_id": "p1", "name": "Fried Rice", "quantity": 2, "note": null }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submitted["kind"], "order");
    assert_eq!(submitted["resolution"], "pending");
    assert_eq!(submitted["session_id"], session_id.as_str());
    let request_id = submitted["id"].as_str().unwrap().to_string();

    // 5. 员工看板可见
    let (status, pending) = get_json(&app, "/api/staff/requests?restaurant_id=rest_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 1);

    // 6. 批准
    let (status, resolved) = send_json(
        &app,
        "POST",
        &format!("/api/staff/requests/{}/approve", request_id),
        None,
        json!({ "staff_id": "staff_9", "notes": "coming up" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["resolution"], "approved");
    assert_eq!(resolved["resolved_by"], "staff_9");

    // 7. 二次批准返回 409 信封
    let (status, envelope) = send_json(
        &app,
        "POST",
        &format!("/api/staff/requests/{}/approve", request_id),
        None,
        json!({ "staff_id": "staff_2" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(envelope["code"], "E0004");
}

#[tokio::test]
async fn test_redeem_with_garbage_token_unauthorized() {
    let app = build_app(test_state());
    let (status, envelope) = send_json(
        &app,
        "POST",
        "/api/guest/redeem",
        None,
        json!({ "qr_token": "not-a-token" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["code"], "E3002");
}

#[tokio::test]
async fn test_stale_qr_returns_gone() {
    let state = test_state();
    let app = build_app(state.clone());

    let (_, issued) = send_json(
        &app,
        "POST",
        "/api/staff/qr/issue",
        None,
        json!({ "restaurant_id": "rest_1", "table_id": "table_7" }),
    )
    .await;
    let old_token = issued["qr_token"].as_str().unwrap().to_string();

    // 轮换后旧码兑换得到 410，提示重扫
    let (status, rotated) = send_json(
        &app,
        "POST",
        "/api/staff/qr/rotate",
        None,
        json!({ "restaurant_id": "rest_1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rotated["qr_version"].as_u64().unwrap() > 1);

    let (status, envelope) = send_json(
        &app,
        "POST",
        "/api/guest/redeem",
        None,
        json!({ "qr_token": old_token }),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(envelope["code"], "E3004");
}

#[tokio::test]
async fn test_guest_routes_require_bearer_token() {
    let app = build_app(test_state());
    let (status, envelope) = send_json(
        &app,
        "POST",
        "/api/guest/waiter-call",
        None,
        json!({ "reason": "menu please" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["code"], "E3001");
}

#[tokio::test]
async fn test_empty_order_is_bad_request() {
    let app = build_app(test_state());
    let state = test_state();
    // 独立 state 只为造访问令牌；使用同一密钥所以两边互通
    let access = state
        .tokens
        .issue_guest_access_token("sess_x", "rest_1", "table_1")
        .unwrap();

    let (status, envelope) = send_json(
        &app,
        "POST",
        "/api/guest/orders",
        Some(&access),
        json!({ "client_request_id": null, "items": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(envelope["code"], "E0002");
}

#[tokio::test]
async fn test_revoked_session_rejected_over_http() {
    let app = build_app(test_state());

    let (_, issued) = send_json(
        &app,
        "POST",
        "/api/staff/qr/issue",
        None,
        json!({ "restaurant_id": "rest_1", "table_id": "table_7" }),
    )
    .await;
    let (_, redeemed) = send_json(
        &app,
        "POST",
        "/api/guest/redeem",
        None,
        json!({ "qr_token": issued["qr_token"] }),
    )
    .await;
    let access_token = redeemed["access_token"].as_str().unwrap().to_string();
    let session_id = redeemed["session"]["id"].as_str().unwrap().to_string();

    let (status, revoked) = send_json(
        &app,
        "POST",
        &format!("/api/staff/sessions/{}/revoke", session_id),
        None,
        json!({ "reason": "table closed" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revoked["status"], "revoked");

    let (status, envelope) = send_json(
        &app,
        "POST",
        "/api/guest/waiter-call",
        Some(&access_token),
        json!({ "reason": null }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(envelope["code"], "E3005");
}
