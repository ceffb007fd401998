//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - HTTP 边界错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E3xxx | 令牌/会话错误 | E3002 无效令牌 |
//! | E0xxx | 业务逻辑错误 | E0003 资源不存在 |
//! | E9xxx | 系统错误 | E9001 内部错误 |
//!
//! 所有核心错误均可恢复，在此映射为用户可见的 HTTP 状态码；
//! 没有任何一类会导致进程退出。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::core::GatewayError;
use crate::session::SessionError;
use crate::token::TokenError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 令牌/会话错误 (4xx) ==========
    #[error("Authentication required")]
    /// 缺少访问令牌 (401)
    Unauthorized,

    #[error("Invalid token")]
    /// 令牌签名或载荷非法 (401)
    InvalidToken,

    #[error("Token expired")]
    /// 令牌过期 (401)
    TokenExpired,

    #[error("QR code version is stale, please rescan the current code")]
    /// QR 版本已轮换 (410) - 提示重印/重扫而非报告篡改
    QrVersionMismatch,

    #[error("Session is not active: {0}")]
    /// 会话不可用 (401) - 不存在/过期/已撤销对调用方收敛为一类
    SessionInvalid(String),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Request already resolved: {0}")]
    /// 请求已有终态 (409)
    AlreadyResolved(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please scan the table QR code first".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".to_string()),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "E3003", "Token expired".to_string()),
            AppError::QrVersionMismatch => (StatusCode::GONE, "E3004", self.to_string()),
            AppError::SessionInvalid(msg) => (StatusCode::UNAUTHORIZED, "E3005", msg.clone()),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::AlreadyResolved(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::VersionMismatch { .. } => AppError::QrVersionMismatch,
            TokenError::InvalidToken(_) | TokenError::InvalidSignature => AppError::InvalidToken,
            TokenError::GenerationFailed(msg) => AppError::Internal(msg),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        // HTTP 层不区分会话失效的具体原因，统一收敛
        AppError::SessionInvalid(e.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::SessionInvalid(msg) => AppError::SessionInvalid(msg),
            GatewayError::NotFound(msg) => AppError::NotFound(msg),
            GatewayError::AlreadyResolved(msg) => AppError::AlreadyResolved(msg),
            GatewayError::Validation(msg) => AppError::Validation(msg),
            GatewayError::Store(msg) => AppError::Internal(msg),
        }
    }
}

/// 处理器的 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
