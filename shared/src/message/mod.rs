//! 实时推送消息
//!
//! 网关通过外部实时传输向两类频道推送事件：
//!
//! - 员工频道: 以 restaurant_id 为键，推送新请求 / 会话变更
//! - 访客频道: 以 session_id 为键，推送审批结果 / 会话撤销

pub mod payload;

pub use payload::{ChannelEvent, GuestChannelEvent, PushChannel, StaffChannelEvent};
