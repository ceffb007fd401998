//! Staff API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{GuestRequest, GuestSession};

use crate::core::ServerState;
use crate::utils::AppResult;

/// 待处理看板查询参数
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub restaurant_id: String,
}

/// GET /api/staff/requests?restaurant_id= - 待处理请求看板
pub async fn pending_requests(
    State(state): State<ServerState>,
    Query(query): Query<PendingQuery>,
) -> AppResult<Json<Vec<GuestRequest>>> {
    let pending = state.requests.pending_requests(&query.restaurant_id).await?;
    Ok(Json(pending))
}

/// 审批请求体
#[derive(Debug, Deserialize)]
pub struct ApprovePayload {
    pub staff_id: String,
    pub notes: Option<String>,
}

/// POST /api/staff/requests/{id}/approve - 批准访客请求
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ApprovePayload>,
) -> AppResult<Json<GuestRequest>> {
    let resolved = state
        .approvals
        .approve(&id, &payload.staff_id, payload.notes)
        .await?;
    Ok(Json(resolved))
}

/// 拒绝请求体 (原因必填)
#[derive(Debug, Deserialize)]
pub struct RejectPayload {
    pub staff_id: String,
    pub reason: String,
}

/// POST /api/staff/requests/{id}/reject - 拒绝访客请求
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RejectPayload>,
) -> AppResult<Json<GuestRequest>> {
    let resolved = state
        .approvals
        .reject(&id, &payload.staff_id, &payload.reason)
        .await?;
    Ok(Json(resolved))
}

/// 撤销会话请求体
#[derive(Debug, Deserialize)]
pub struct RevokePayload {
    pub reason: String,
}

/// POST /api/staff/sessions/{id}/revoke - 撤销会话 (关台)
pub async fn revoke_session(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RevokePayload>,
) -> AppResult<Json<GuestSession>> {
    let revoked = state.sessions.revoke(&id, &payload.reason).await?;
    Ok(Json(revoked))
}

/// QR 版本轮换请求体
#[derive(Debug, Deserialize)]
pub struct RotatePayload {
    pub restaurant_id: String,
}

/// QR 版本轮换响应
#[derive(Debug, Serialize)]
pub struct RotateResponse {
    pub restaurant_id: String,
    /// 轮换后的当前版本；旧版本的印刷码自此作废
    pub qr_version: u64,
}

/// POST /api/staff/qr/rotate - 轮换餐厅 QR 版本
pub async fn rotate_qr_version(
    State(state): State<ServerState>,
    Json(payload): Json<RotatePayload>,
) -> Json<RotateResponse> {
    let qr_version = state.qr_versions.rotate(&payload.restaurant_id);
    tracing::info!(
        restaurant_id = %payload.restaurant_id,
        qr_version,
        "QR version rotated, previously printed codes invalidated"
    );
    Json(RotateResponse {
        restaurant_id: payload.restaurant_id,
        qr_version,
    })
}

/// QR 签发请求体
#[derive(Debug, Deserialize)]
pub struct IssueQrPayload {
    pub restaurant_id: String,
    pub table_id: String,
}

/// QR 签发响应 (印码用)
#[derive(Debug, Serialize)]
pub struct IssueQrResponse {
    pub qr_token: String,
    pub qr_version: u64,
}

/// POST /api/staff/qr/issue - 为桌台签发当前版本的 QR 令牌
pub async fn issue_qr_token(
    State(state): State<ServerState>,
    Json(payload): Json<IssueQrPayload>,
) -> AppResult<Json<IssueQrResponse>> {
    let qr_version = state.qr_versions.current(&payload.restaurant_id);
    let qr_token = state
        .tokens
        .issue_qr_token(&payload.restaurant_id, &payload.table_id, qr_version)?;
    Ok(Json(IssueQrResponse {
        qr_token,
        qr_version,
    }))
}
