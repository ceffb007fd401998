//! Approval Coordinator
//!
//! 员工对访客请求的审批/拒绝。
//!
//! # 状态机
//!
//! ```text
//! pending -> approved   (approve, 备注可选)
//! pending -> rejected   (reject, 原因必填)
//! ```
//!
//! 两个终态均不可再变更；二次处理报 `AlreadyResolved` 且原结果不动。
//!
//! 员工动作是事实来源: 状态迁移先落库，然后在本次调用内同步向
//! 发起会话的访客频道推送结果 (访客端没有轮询兜底)。
//! 推送失败记日志后吞掉，绝不回滚已提交的迁移。

use chrono::Utc;
use std::sync::Arc;

use shared::message::{GuestChannelEvent, PushChannel};
use shared::models::{GuestRequest, RequestResolution};

use crate::core::{GatewayError, GatewayResult};
use crate::notify::{GuestNotifier, notify_best_effort};
use crate::store::{RequestStore, StoreError};

/// 审批协调器
pub struct ApprovalCoordinator {
    store: Arc<dyn RequestStore>,
    notifier: Arc<dyn GuestNotifier>,
    notify_timeout: std::time::Duration,
}

impl std::fmt::Debug for ApprovalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalCoordinator").finish_non_exhaustive()
    }
}

impl ApprovalCoordinator {
    pub fn new(
        store: Arc<dyn RequestStore>,
        notifier: Arc<dyn GuestNotifier>,
        notify_timeout: std::time::Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            notify_timeout,
        }
    }

    /// 批准请求
    pub async fn approve(
        &self,
        request_id: &str,
        staff_id: &str,
        notes: Option<String>,
    ) -> GatewayResult<GuestRequest> {
        self.resolve(request_id, staff_id, RequestResolution::Approved, notes)
            .await
    }

    /// 拒绝请求 (原因必填)
    ///
    /// 原因为空时在任何状态变更之前就失败。
    pub async fn reject(
        &self,
        request_id: &str,
        staff_id: &str,
        reason: &str,
    ) -> GatewayResult<GuestRequest> {
        if reason.trim().is_empty() {
            return Err(GatewayError::Validation(
                "rejection reason must not be empty".into(),
            ));
        }

        self.resolve(
            request_id,
            staff_id,
            RequestResolution::Rejected,
            Some(reason.to_string()),
        )
        .await
    }

    async fn resolve(
        &self,
        request_id: &str,
        staff_id: &str,
        resolution: RequestResolution,
        notes: Option<String>,
    ) -> GatewayResult<GuestRequest> {
        let resolved = self
            .store
            .resolve(request_id, resolution, staff_id, notes.clone(), Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(msg) => GatewayError::NotFound(msg),
                StoreError::Conflict(msg) => GatewayError::AlreadyResolved(msg),
                StoreError::Backend(msg) => GatewayError::Store(msg),
            })?;

        tracing::info!(
            request_id = %request_id,
            staff_id = %staff_id,
            resolution = %resolution,
            "Guest request resolved"
        );

        // 同步推送审批结果到发起会话的访客频道 (尽力而为)
        notify_best_effort(
            self.notifier.as_ref(),
            self.notify_timeout,
            PushChannel::Guest(resolved.session_id.clone()),
            GuestChannelEvent::RequestResolved {
                request_id: resolved.id.clone(),
                resolution,
                notes,
            }
            .into(),
        )
        .await;

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{FailingNotifier, RecordingNotifier};
    use crate::store::MemoryRequestStore;
    use shared::models::{GuestRequestKind, WaiterCallInfo};

    const NOTIFY_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(100);

    async fn seeded_store() -> Arc<MemoryRequestStore> {
        let store = Arc::new(MemoryRequestStore::new());
        store
            .find_or_insert(GuestRequest {
                id: "req_1".to_string(),
                session_id: "sess_1".to_string(),
                restaurant_id: "rest_1".to_string(),
                table_id: "table_1".to_string(),
                kind: GuestRequestKind::WaiterCall(WaiterCallInfo {
                    reason: None,
                    urgency: Default::default(),
                }),
                created_at: Utc::now(),
                resolution: RequestResolution::Pending,
                resolved_by: None,
                resolved_at: None,
                resolution_notes: None,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_approve_notifies_guest_channel() {
        let store = seeded_store().await;
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator =
            ApprovalCoordinator::new(store, notifier.clone(), NOTIFY_TIMEOUT);

        let resolved = coordinator
            .approve("req_1", "staff_9", Some("on its way".into()))
            .await
            .unwrap();
        assert_eq!(resolved.resolution, RequestResolution::Approved);
        assert_eq!(resolved.resolved_by.as_deref(), Some("staff_9"));
        assert_eq!(
            notifier.count_for(&PushChannel::Guest("sess_1".to_string())),
            1
        );
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let store = seeded_store().await;
        let notifier = Arc::new(RecordingNotifier::new());
        let coordinator =
            ApprovalCoordinator::new(store.clone(), notifier.clone(), NOTIFY_TIMEOUT);

        let err = coordinator.reject("req_1", "staff_9", "   ").await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        // 验证失败发生在任何状态变更之前
        let stored = store.find_by_id("req_1").await.unwrap().unwrap();
        assert_eq!(stored.resolution, RequestResolution::Pending);
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_double_resolution_fails_and_keeps_original() {
        let store = seeded_store().await;
        let coordinator = ApprovalCoordinator::new(
            store.clone(),
            Arc::new(RecordingNotifier::new()),
            NOTIFY_TIMEOUT,
        );

        coordinator.approve("req_1", "staff_9", None).await.unwrap();

        let err = coordinator.approve("req_1", "staff_2", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::AlreadyResolved(_)));
        let err = coordinator
            .reject("req_1", "staff_2", "too late")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AlreadyResolved(_)));

        let stored = store.find_by_id("req_1").await.unwrap().unwrap();
        assert_eq!(stored.resolution, RequestResolution::Approved);
        assert_eq!(stored.resolved_by.as_deref(), Some("staff_9"));
    }

    #[tokio::test]
    async fn test_unknown_request_not_found() {
        let coordinator = ApprovalCoordinator::new(
            Arc::new(MemoryRequestStore::new()),
            Arc::new(RecordingNotifier::new()),
            NOTIFY_TIMEOUT,
        );
        let err = coordinator.approve("ghost", "staff_9", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_notify_failure_does_not_revert_resolution() {
        let store = seeded_store().await;
        let coordinator = ApprovalCoordinator::new(
            store.clone(),
            Arc::new(FailingNotifier),
            NOTIFY_TIMEOUT,
        );

        let resolved = coordinator.approve("req_1", "staff_9", None).await.unwrap();
        assert_eq!(resolved.resolution, RequestResolution::Approved);

        let stored = store.find_by_id("req_1").await.unwrap().unwrap();
        assert_eq!(stored.resolution, RequestResolution::Approved);
    }
}
