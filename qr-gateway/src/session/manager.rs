//! Session Manager
//!
//! 访客会话生命周期管理。
//!
//! # 生命周期
//!
//! ```text
//! QR 兑换 -> create_session (每次兑换都新建，不复用)
//!     ├─ 访客提交请求 -> touch (last_activity_at 单调推进)
//!     ├─ 员工关台 -> revoke (立即、不可逆)
//!     └─ 到达硬截止 -> Expired
//!          ├─ 惰性: get_active_session 发现越期即落库
//!          └─ 兜底: 周期清扫 reconcile 存储状态
//! ```
//!
//! # 过期策略
//!
//! TTL 为创建时刻起的硬截止 (hard deadline)，`touch` 不延长有效期。
//! 物理就餐有自然时长上限，滑动窗口只会让遗忘的会话长期滞留。

use chrono::{Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use shared::message::{GuestChannelEvent, PushChannel, StaffChannelEvent};
use shared::models::{GuestSession, QrTokenPayload, SessionStatus};

use crate::notify::{GuestNotifier, notify_best_effort};
use crate::store::{SessionStore, StoreError, StoreResult};

/// 会话错误
///
/// `get_active_session` 的三种失败对 HTTP 调用方会收敛为一类，
/// 但管理接口 (撤销、看板) 需要区分。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} expired")]
    Expired(String),

    #[error("session {0} revoked")]
    Revoked(String),
}

/// 会话管理器
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn GuestNotifier>,
    /// 会话 TTL (硬截止)
    ttl: Duration,
    /// 推送超时
    notify_timeout: std::time::Duration,
    /// 逐会话互斥锁: 撤销与在途提交互斥
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        notifier: Arc<dyn GuestNotifier>,
        ttl_secs: i64,
        notify_timeout: std::time::Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            ttl: Duration::seconds(ttl_secs),
            notify_timeout,
            locks: DashMap::new(),
        }
    }

    /// 获取某会话的互斥锁
    ///
    /// 请求受理方在 校验-提交 全程持有，撤销方同样持有，
    /// 保证已撤销的会话不会接受在途请求。
    pub fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 兑换 QR 令牌后创建新会话
    ///
    /// 每次兑换都创建全新会话，绝不跨兑换复用 —
    /// 避免两拨无关的客人共享状态。
    pub async fn create_session(
        &self,
        qr: &QrTokenPayload,
        device_fingerprint: Option<&str>,
        table_name: Option<String>,
    ) -> StoreResult<GuestSession> {
        let now = Utc::now();
        let session = GuestSession {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id: qr.restaurant_id.clone(),
            table_id: qr.table_id.clone(),
            table_name,
            device_fingerprint: device_fingerprint.map(hash_fingerprint),
            status: SessionStatus::Active,
            created_at: now,
            expires_at: now + self.ttl,
            last_activity_at: now,
            revoke_reason: None,
        };

        self.store.save(session.clone()).await?;
        tracing::info!(
            session_id = %session.id,
            restaurant_id = %session.restaurant_id,
            table_id = %session.table_id,
            "Guest session created"
        );
        Ok(session)
    }

    /// 获取活跃会话
    ///
    /// 惰性过期: 存储状态仍为 `active` 但已过 `expires_at` 的会话
    /// 一律报告 `Expired`，并顺手把存储状态落为终态。
    pub async fn get_active_session(&self, id: &str) -> Result<GuestSession, SessionError> {
        let session = match self.store.find_by_id(id).await {
            Ok(Some(s)) => s,
            Ok(None) => return Err(SessionError::NotFound(id.to_string())),
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Session lookup failed");
                return Err(SessionError::NotFound(id.to_string()));
            }
        };

        match session.status {
            SessionStatus::Revoked => Err(SessionError::Revoked(id.to_string())),
            SessionStatus::Expired => Err(SessionError::Expired(id.to_string())),
            SessionStatus::Active => {
                if Utc::now() >= session.expires_at {
                    // 存储状态落后于真实状态，reconcile 后按过期处理
                    if let Err(e) = self
                        .store
                        .transition(id, SessionStatus::Expired, None)
                        .await
                    {
                        tracing::warn!(session_id = %id, error = %e, "Lazy expiry reconcile failed");
                    }
                    self.locks.remove(id);
                    return Err(SessionError::Expired(id.to_string()));
                }
                Ok(session)
            }
        }
    }

    /// 推进最近活动时间
    pub async fn touch(&self, id: &str) -> StoreResult<()> {
        self.store.touch(id, Utc::now()).await
    }

    /// 撤销会话 (员工触发，立即且不可逆)
    ///
    /// 与同会话的在途提交互斥；撤销成功后向访客端和员工看板推送。
    pub async fn revoke(&self, id: &str, reason: &str) -> Result<GuestSession, SessionError> {
        let lock = self.session_lock(id);
        let _guard = lock.lock().await;

        // 先走一遍活跃性检查，让已过期/已撤销的会话报出准确原因
        let session = self.get_active_session(id).await?;

        let revoked = match self
            .store
            .transition(id, SessionStatus::Revoked, Some(reason.to_string()))
            .await
        {
            Ok(s) => s,
            Err(StoreError::Conflict(_)) => return Err(SessionError::Revoked(id.to_string())),
            Err(StoreError::NotFound(_)) => return Err(SessionError::NotFound(id.to_string())),
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Session revoke failed");
                return Err(SessionError::NotFound(id.to_string()));
            }
        };

        tracing::info!(session_id = %id, reason = %reason, "Guest session revoked");
        self.locks.remove(id);

        // 推送是旁路信号，失败不影响已落库的撤销
        notify_best_effort(
            self.notifier.as_ref(),
            self.notify_timeout,
            PushChannel::Guest(id.to_string()),
            GuestChannelEvent::SessionRevoked {
                reason: reason.to_string(),
            }
            .into(),
        )
        .await;
        notify_best_effort(
            self.notifier.as_ref(),
            self.notify_timeout,
            PushChannel::Staff(session.restaurant_id.clone()),
            StaffChannelEvent::SessionRevoked {
                session_id: id.to_string(),
                table_id: session.table_id.clone(),
                reason: reason.to_string(),
            }
            .into(),
        )
        .await;

        Ok(revoked)
    }

    /// 清扫过期会话，将越期的存储状态落为 `Expired`
    ///
    /// 返回本轮落库的数量；单个失败只记日志，下一轮重试。
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let overdue = match self.store.overdue(now).await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = %e, "Expiry sweep failed to list overdue sessions");
                return 0;
            }
        };

        let mut swept = 0;
        for session in overdue {
            let lock = self.session_lock(&session.id);
            let _guard = lock.lock().await;

            match self
                .store
                .transition(&session.id, SessionStatus::Expired, None)
                .await
            {
                Ok(_) => {
                    swept += 1;
                    self.locks.remove(&session.id);
                    notify_best_effort(
                        self.notifier.as_ref(),
                        self.notify_timeout,
                        PushChannel::Staff(session.restaurant_id.clone()),
                        StaffChannelEvent::SessionExpired {
                            session_id: session.id.clone(),
                            table_id: session.table_id.clone(),
                        }
                        .into(),
                    )
                    .await;
                }
                // 清扫和惰性过期/撤销赛跑输了，没关系
                Err(StoreError::Conflict(_)) => {
                    self.locks.remove(&session.id);
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id, error = %e, "Expiry sweep transition failed");
                }
            }
        }

        if swept > 0 {
            tracing::info!(count = swept, "Expiry sweep marked sessions expired");
        }
        swept
    }
}

/// 设备指纹哈希 (sha256 hex)
///
/// 原始指纹材料不落盘。
fn hash_fingerprint(material: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::MemorySessionStore;

    const NOTIFY_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(100);

    fn qr_payload() -> QrTokenPayload {
        QrTokenPayload {
            restaurant_id: "rest_1".to_string(),
            table_id: "table_7".to_string(),
            qr_version: 1,
            iat: Utc::now().timestamp(),
            token_type: "qr".to_string(),
        }
    }

    fn manager_with_ttl(ttl_secs: i64) -> (SessionManager, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let manager = SessionManager::new(
            Arc::new(MemorySessionStore::new()),
            notifier.clone(),
            ttl_secs,
            NOTIFY_TIMEOUT,
        );
        (manager, notifier)
    }

    #[tokio::test]
    async fn test_create_then_get_active() {
        let (manager, _) = manager_with_ttl(600);
        let session = manager
            .create_session(&qr_payload(), Some("ua-fingerprint"), Some("T7".into()))
            .await
            .unwrap();

        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.expires_at >= session.created_at);
        // 指纹只存哈希
        assert_ne!(
            session.device_fingerprint.as_deref(),
            Some("ua-fingerprint")
        );

        let fetched = manager.get_active_session(&session.id).await.unwrap();
        assert_eq!(fetched.restaurant_id, "rest_1");
        assert_eq!(fetched.table_id, "table_7");
    }

    #[tokio::test]
    async fn test_each_redemption_creates_fresh_session() {
        let (manager, _) = manager_with_ttl(600);
        let a = manager.create_session(&qr_payload(), None, None).await.unwrap();
        let b = manager.create_session(&qr_payload(), None, None).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_lazy_expiry_past_deadline() {
        let (manager, _) = manager_with_ttl(0);
        let session = manager.create_session(&qr_payload(), None, None).await.unwrap();

        // TTL 0: 存储状态仍是 active，但截止已过
        let err = manager.get_active_session(&session.id).await.unwrap_err();
        assert!(matches!(err, SessionError::Expired(_)));

        // 再次读取: 存储状态已被 reconcile 为终态
        let err = manager.get_active_session(&session.id).await.unwrap_err();
        assert!(matches!(err, SessionError::Expired(_)));
    }

    #[tokio::test]
    async fn test_revoke_is_irreversible_and_notifies() {
        let (manager, notifier) = manager_with_ttl(600);
        let session = manager.create_session(&qr_payload(), None, None).await.unwrap();

        let revoked = manager.revoke(&session.id, "table closed").await.unwrap();
        assert_eq!(revoked.status, SessionStatus::Revoked);
        assert_eq!(revoked.revoke_reason.as_deref(), Some("table closed"));

        let err = manager.get_active_session(&session.id).await.unwrap_err();
        assert!(matches!(err, SessionError::Revoked(_)));

        // 二次撤销报 Revoked
        let err = manager.revoke(&session.id, "again").await.unwrap_err();
        assert!(matches!(err, SessionError::Revoked(_)));

        // 访客频道 + 员工频道各一条
        assert_eq!(notifier.count_for(&PushChannel::Guest(session.id.clone())), 1);
        assert_eq!(
            notifier.count_for(&PushChannel::Staff("rest_1".to_string())),
            1
        );
    }

    #[tokio::test]
    async fn test_sweep_marks_overdue_and_reports_count() {
        let (manager, notifier) = manager_with_ttl(0);
        let s1 = manager.create_session(&qr_payload(), None, None).await.unwrap();
        let s2 = manager.create_session(&qr_payload(), None, None).await.unwrap();

        let swept = manager.sweep_expired().await;
        assert_eq!(swept, 2);

        for id in [&s1.id, &s2.id] {
            let err = manager.get_active_session(id).await.unwrap_err();
            assert!(matches!(err, SessionError::Expired(_)));
        }
        assert_eq!(
            notifier.count_for(&PushChannel::Staff("rest_1".to_string())),
            2
        );

        // 第二轮没有新的越期会话
        assert_eq!(manager.sweep_expired().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let (manager, _) = manager_with_ttl(600);
        let err = manager.get_active_session("nope").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }
}
