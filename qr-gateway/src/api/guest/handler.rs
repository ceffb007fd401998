//! Guest API Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::models::{BillRequestInfo, GuestRequest, GuestSession, OrderInfo, WaiterCallInfo};

use super::GuestAuth;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// QR 兑换请求体
#[derive(Debug, Deserialize)]
pub struct RedeemPayload {
    /// 桌台码中的 QR 令牌
    pub qr_token: String,
    /// 设备指纹材料 (可选，服务端只存哈希)
    pub device_fingerprint: Option<String>,
    /// 桌台显示名 (可选，由扫码页面携带)
    pub table_name: Option<String>,
}

/// QR 兑换响应
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    /// 新建的会话
    pub session: GuestSession,
    /// 访客访问令牌 (后续请求的 Bearer)
    pub access_token: String,
}

/// POST /api/guest/redeem - 兑换 QR 令牌，创建会话
///
/// 令牌版本与餐厅当前版本不符时返回 E3004，
/// 提示客人重扫当前桌台码而非报告令牌非法。
pub async fn redeem(
    State(state): State<ServerState>,
    Json(payload): Json<RedeemPayload>,
) -> AppResult<Json<RedeemResponse>> {
    let qr = state
        .tokens
        .verify_qr_token(&payload.qr_token, |restaurant_id| {
            state.qr_versions.current(restaurant_id)
        })?;

    let session = state
        .sessions
        .create_session(
            &qr,
            payload.device_fingerprint.as_deref(),
            payload.table_name,
        )
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let access_token =
        state
            .tokens
            .issue_guest_access_token(&session.id, &session.restaurant_id, &session.table_id)?;

    Ok(Json(RedeemResponse {
        session,
        access_token,
    }))
}

/// GET /api/guest/session - 当前会话视图
pub async fn session_info(
    State(state): State<ServerState>,
    GuestAuth(claims): GuestAuth,
) -> AppResult<Json<GuestSession>> {
    let session = state.sessions.get_active_session(&claims.session_id).await?;
    Ok(Json(session))
}

/// POST /api/guest/waiter-call - 呼叫服务员
pub async fn waiter_call(
    State(state): State<ServerState>,
    GuestAuth(claims): GuestAuth,
    Json(info): Json<WaiterCallInfo>,
) -> AppResult<Json<GuestRequest>> {
    let request = state
        .requests
        .submit_waiter_call(&claims.session_id, info)
        .await?;
    Ok(Json(request))
}

/// POST /api/guest/bill-request - 请求结账
pub async fn bill_request(
    State(state): State<ServerState>,
    GuestAuth(claims): GuestAuth,
    Json(info): Json<BillRequestInfo>,
) -> AppResult<Json<GuestRequest>> {
    let request = state
        .requests
        .submit_bill_request(&claims.session_id, info)
        .await?;
    Ok(Json(request))
}

/// POST /api/guest/orders - 提交订单 (待员工审批)
///
/// 携带 client_request_id 时幂等: 同一会话下的重试
/// 返回首次创建的订单请求。
pub async fn submit_order(
    State(state): State<ServerState>,
    GuestAuth(claims): GuestAuth,
    Json(info): Json<OrderInfo>,
) -> AppResult<Json<GuestRequest>> {
    let request = state
        .requests
        .submit_order(&claims.session_id, info)
        .await?;
    Ok(Json(request))
}
