//! Guest Session Model
//!
//! 访客会话 - 匿名食客扫码后与单张桌台之间的短时绑定。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 会话状态
///
/// `Revoked` 与 `Expired` 为终态，不可回退。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// 活跃中
    Active,
    /// 员工主动撤销 (如关台)
    Revoked,
    /// 超过 TTL 过期
    Expired,
}

impl SessionStatus {
    /// 是否终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Revoked | SessionStatus::Expired)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Revoked => write!(f, "revoked"),
            SessionStatus::Expired => write!(f, "expired"),
        }
    }
}

/// 访客会话实体
///
/// # 不变量
///
/// - (restaurant_id, table_id) 创建后不可变
/// - `expires_at >= created_at`
/// - 活跃期间 `last_activity_at` 单调不减
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSession {
    /// 会话 ID (UUID v4)
    pub id: String,
    /// 所属餐厅
    pub restaurant_id: String,
    /// 绑定桌台
    pub table_id: String,
    /// 桌台显示名 (可选，来自 QR 兑换时的桌台信息)
    pub table_name: Option<String>,
    /// 设备指纹哈希 (sha256 hex，可选)
    pub device_fingerprint: Option<String>,
    /// 会话状态
    pub status: SessionStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 硬过期时间 (创建时刻 + TTL，不随活动延长)
    pub expires_at: DateTime<Utc>,
    /// 最近活动时间
    pub last_activity_at: DateTime<Utc>,
    /// 撤销原因 (仅 Revoked 时存在)
    pub revoke_reason: Option<String>,
}

impl GuestSession {
    /// 按存储字段判断此刻是否仍在有效期内
    ///
    /// 仅做只读判断，不修改状态；惰性过期由 SessionManager 负责落库。
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && now < self.expires_at
    }
}
