//! 共享类型库 - 客户端与网关共用的数据结构
//!
//! 本 crate 定义扫码点餐网关对外可见的全部类型：
//!
//! - **models**: 持久化实体 (访客会话、访客请求) 及其 DTO
//! - **message**: 实时推送事件载荷 (员工频道 / 访客频道)
//! - **types**: 基础类型别名

pub mod message;
pub mod models;
pub mod types;

// Re-export 常用类型
pub use message::{ChannelEvent, GuestChannelEvent, PushChannel, StaffChannelEvent};
pub use models::{
    GuestAccessTokenPayload, GuestRequest, GuestRequestKind, GuestSession, QrTokenPayload,
    RequestResolution, SessionStatus, Urgency,
};
pub use types::Timestamp;
