//! Token Payloads
//!
//! 两类签名令牌的 Claims 结构：
//!
//! - [`QrTokenPayload`]: 印在桌台 QR 码里的长期令牌，无自身过期，
//!   兑换时与餐厅当前 qr_version 比对实现作废
//! - [`GuestAccessTokenPayload`]: 会话创建后发给访客客户端的访问令牌，
//!   生命周期完全跟随会话

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// QR 令牌类型标签
pub const TOKEN_TYPE_QR: &str = "qr";
/// 访客访问令牌类型标签
pub const TOKEN_TYPE_GUEST: &str = "guest";

/// QR 码内嵌 Claims
///
/// 一经签发不可变；重新印刷桌台码时递增餐厅的 qr_version，
/// 旧版本令牌在兑换时失效 (VersionMismatch)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrTokenPayload {
    /// 餐厅 ID
    pub restaurant_id: String,
    /// 桌台 ID
    pub table_id: String,
    /// 签发时餐厅的 QR 版本号
    pub qr_version: u64,
    /// 签发时间 (epoch 秒)
    pub iat: Timestamp,
    /// 令牌类型 (固定 "qr")
    pub token_type: String,
}

/// 访客访问令牌 Claims
///
/// 将后续每个访客请求限定到恰好一个会话；
/// 不携带独立过期时间，有效性以会话为准。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestAccessTokenPayload {
    /// 会话 ID
    pub session_id: String,
    /// 餐厅 ID
    pub restaurant_id: String,
    /// 桌台 ID
    pub table_id: String,
    /// 签发时间 (epoch 秒)
    pub iat: Timestamp,
    /// 令牌类型 (固定 "guest")
    pub token_type: String,
}
