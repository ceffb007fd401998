//! 员工 API 模块
//!
//! 员工身份认证归宿主系统 (本核心的非目标)，
//! 处理函数直接接收 staff_id。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/requests", get(handler::pending_requests))
        .route("/requests/{id}/approve", post(handler::approve))
        .route("/requests/{id}/reject", post(handler::reject))
        .route("/sessions/{id}/revoke", post(handler::revoke_session))
        .route("/qr/rotate", post(handler::rotate_qr_version))
        .route("/qr/issue", post(handler::issue_qr_token))
}
