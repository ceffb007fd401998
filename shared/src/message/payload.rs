use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{GuestRequest, RequestResolution};

// ==================== Push Channel ====================

/// 推送频道标识
///
/// 通知是尽力而为的旁路信号，频道键决定事件投递给谁。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "channel", content = "key", rename_all = "lowercase")]
pub enum PushChannel {
    /// 员工看板频道 (按餐厅)
    Staff(String),
    /// 访客频道 (按会话)
    Guest(String),
}

impl fmt::Display for PushChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushChannel::Staff(id) => write!(f, "staff:{}", id),
            PushChannel::Guest(id) => write!(f, "guest:{}", id),
        }
    }
}

/// 频道事件 (两类频道载荷的统一包装，供推送端口使用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelEvent {
    Staff(StaffChannelEvent),
    Guest(GuestChannelEvent),
}

impl From<StaffChannelEvent> for ChannelEvent {
    fn from(e: StaffChannelEvent) -> Self {
        ChannelEvent::Staff(e)
    }
}

impl From<GuestChannelEvent> for ChannelEvent {
    fn from(e: GuestChannelEvent) -> Self {
        ChannelEvent::Guest(e)
    }
}

// ==================== Staff Channel Events ====================

/// 员工频道事件 (网关 -> 员工看板)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StaffChannelEvent {
    /// 访客提交了新请求
    RequestSubmitted {
        request: GuestRequest,
        /// 桌台显示名 (便于看板直接展示)
        table_name: Option<String>,
    },
    /// 会话被撤销 (关台等)
    SessionRevoked {
        session_id: String,
        table_id: String,
        reason: String,
    },
    /// 后台清扫将会话标记过期
    SessionExpired { session_id: String, table_id: String },
}

// ==================== Guest Channel Events ====================

/// 访客频道事件 (网关 -> 访客客户端)
///
/// 访客端没有轮询兜底，审批结果必须在处理调用内同步尝试推送。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GuestChannelEvent {
    /// 请求处理结果
    RequestResolved {
        request_id: String,
        resolution: RequestResolution,
        /// 审批备注或拒绝原因
        notes: Option<String>,
    },
    /// 会话被撤销，客户端应停止后续提交
    SessionRevoked { reason: String },
}
