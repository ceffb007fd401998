//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`guest`] - 访客侧接口 (QR 兑换、请求提交)
//! - [`staff`] - 员工侧接口 (审批、撤销、QR 版本管理)
//!
//! 完整的 Web 层归宿主系统所有；这里只挂出最小的 HTTP 表面，
//! 使网关可独立运行和集成测试。

pub mod guest;
pub mod health;
pub mod staff;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum application
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(guest::router())
        .merge(staff::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
