//! 网关核心错误
//!
//! 核心服务 (请求受理、审批) 对外统一的错误分类。
//! 会话层的 NotFound/Expired/Revoked 在这里收敛为 `SessionInvalid`，
//! 调用方只需要知道"会话不可用"。

use thiserror::Error;

use crate::store::StoreError;

/// 网关核心错误枚举
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Session is not active: {0}")]
    SessionInvalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already resolved: {0}")]
    AlreadyResolved(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for GatewayError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => GatewayError::NotFound(msg),
            StoreError::Conflict(msg) => GatewayError::AlreadyResolved(msg),
            StoreError::Backend(msg) => GatewayError::Store(msg),
        }
    }
}

/// 核心服务的 Result 类型别名
pub type GatewayResult<T> = Result<T, GatewayError>;
