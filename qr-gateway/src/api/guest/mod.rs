//! 访客 API 模块
//!
//! 兑换接口公开；其余接口要求 `Authorization: Bearer <访客访问令牌>`。

mod extractor;
mod handler;

pub use extractor::GuestAuth;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/guest", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/redeem", post(handler::redeem))
        .route("/session", get(handler::session_info))
        .route("/waiter-call", post(handler::waiter_call))
        .route("/bill-request", post(handler::bill_request))
        .route("/orders", post(handler::submit_order))
}
