//! Data Models
//!
//! 访客会话与访客请求实体，以及嵌入签名令牌的 Claims 结构。

pub mod guest_request;
pub mod guest_session;
pub mod token_payload;

pub use guest_request::{
    BillRequestInfo, GuestRequest, GuestRequestKind, OrderItemInput, OrderInfo, RequestResolution,
    Urgency, WaiterCallInfo,
};
pub use guest_session::{GuestSession, SessionStatus};
pub use token_payload::{GuestAccessTokenPayload, QrTokenPayload};
