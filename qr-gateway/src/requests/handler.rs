//! Guest Request Handler
//!
//! 受理访客的三类请求: 呼叫服务员 / 请求结账 / 提交订单。
//!
//! # 受理流程
//!
//! ```text
//! submit(session_id, kind)
//!     ├─ 1. 取会话互斥锁 (与 revoke 互斥)
//!     ├─ 2. 会话活跃性校验 (失败 -> SessionInvalid)
//!     ├─ 3. find_or_insert (订单按 client_request_id 幂等去重)
//!     │      └─ 重放: 直接返回首次结果，不再触活/推送
//!     ├─ 4. touch 会话
//!     └─ 5. 推送员工频道 (尽力而为)
//! ```
//!
//! 幂等的意义: 访客端跑在不可靠的移动网络上，网络失败会盲目重试；
//! 同一 (session, client_request_id) 的重试必须拿到同一个订单。

use chrono::Utc;
use std::sync::Arc;

use shared::message::{PushChannel, StaffChannelEvent};
use shared::models::{
    BillRequestInfo, GuestRequest, GuestRequestKind, GuestSession, OrderInfo, RequestResolution,
    WaiterCallInfo,
};

use crate::core::{GatewayError, GatewayResult};
use crate::notify::{GuestNotifier, notify_best_effort};
use crate::session::SessionManager;
use crate::store::RequestStore;

/// 访客请求受理服务
pub struct GuestRequestService {
    sessions: Arc<SessionManager>,
    store: Arc<dyn RequestStore>,
    notifier: Arc<dyn GuestNotifier>,
    notify_timeout: std::time::Duration,
}

impl std::fmt::Debug for GuestRequestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestRequestService").finish_non_exhaustive()
    }
}

impl GuestRequestService {
    pub fn new(
        sessions: Arc<SessionManager>,
        store: Arc<dyn RequestStore>,
        notifier: Arc<dyn GuestNotifier>,
        notify_timeout: std::time::Duration,
    ) -> Self {
        Self {
            sessions,
            store,
            notifier,
            notify_timeout,
        }
    }

    /// 呼叫服务员
    pub async fn submit_waiter_call(
        &self,
        session_id: &str,
        info: WaiterCallInfo,
    ) -> GatewayResult<GuestRequest> {
        self.submit(session_id, GuestRequestKind::WaiterCall(info))
            .await
    }

    /// 请求结账
    pub async fn submit_bill_request(
        &self,
        session_id: &str,
        info: BillRequestInfo,
    ) -> GatewayResult<GuestRequest> {
        self.submit(session_id, GuestRequestKind::BillRequest(info))
            .await
    }

    /// 提交订单 (待员工审批)
    pub async fn submit_order(
        &self,
        session_id: &str,
        info: OrderInfo,
    ) -> GatewayResult<GuestRequest> {
        if info.items.is_empty() {
            return Err(GatewayError::Validation("order must contain items".into()));
        }
        if let Some(bad) = info.items.iter().find(|i| i.quantity == 0) {
            return Err(GatewayError::Validation(format!(
                "item '{}' has zero quantity",
                bad.name
            )));
        }

        self.submit(session_id, GuestRequestKind::Order(info)).await
    }

    /// 某餐厅的待处理请求看板
    pub async fn pending_requests(&self, restaurant_id: &str) -> GatewayResult<Vec<GuestRequest>> {
        Ok(self.store.pending_for_restaurant(restaurant_id).await?)
    }

    /// 统一受理路径
    async fn submit(
        &self,
        session_id: &str,
        kind: GuestRequestKind,
    ) -> GatewayResult<GuestRequest> {
        // 与 revoke 互斥: 持锁期间会话状态不会被撤销方改写
        let lock = self.sessions.session_lock(session_id);
        let _guard = lock.lock().await;

        let session = self
            .sessions
            .get_active_session(session_id)
            .await
            .map_err(|e| GatewayError::SessionInvalid(e.to_string()))?;

        let request = GuestRequest {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            restaurant_id: session.restaurant_id.clone(),
            table_id: session.table_id.clone(),
            kind,
            created_at: Utc::now(),
            resolution: RequestResolution::Pending,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
        };

        let label = request.kind.label();
        let (request, created) = self.store.find_or_insert(request).await?;

        if !created {
            // 网络重试的重放: 返回首次结果，不重复触活也不重复推送
            tracing::debug!(
                session_id = %session_id,
                request_id = %request.id,
                "Duplicate submission replayed, returning original request"
            );
            return Ok(request);
        }

        if let Err(e) = self.sessions.touch(session_id).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to touch session");
        }

        tracing::info!(
            session_id = %session_id,
            request_id = %request.id,
            kind = %label,
            "Guest request submitted"
        );

        self.notify_staff(&session, &request).await;
        Ok(request)
    }

    async fn notify_staff(&self, session: &GuestSession, request: &GuestRequest) {
        notify_best_effort(
            self.notifier.as_ref(),
            self.notify_timeout,
            PushChannel::Staff(session.restaurant_id.clone()),
            StaffChannelEvent::RequestSubmitted {
                request: request.clone(),
                table_name: session.table_name.clone(),
            }
            .into(),
        )
        .await;
    }
}
