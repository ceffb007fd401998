//! Session Store
//!
//! 访客会话的持久化端口与进程内实现。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use shared::models::{GuestSession, SessionStatus};

use super::{StoreError, StoreResult};

/// 会话存储端口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 保存新会话
    async fn save(&self, session: GuestSession) -> StoreResult<()>;

    /// 按 ID 查找
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<GuestSession>>;

    /// 状态迁移 (仅允许 Active -> 终态)
    ///
    /// 返回迁移后的会话；会话已处于终态时返回 `Conflict`，
    /// 保证撤销与在途提交互斥时第二个写者能观察到第一个的结果。
    async fn transition(
        &self,
        id: &str,
        status: SessionStatus,
        reason: Option<String>,
    ) -> StoreResult<GuestSession>;

    /// 更新最近活动时间 (单调不减)
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// 列出存储状态仍为 Active 但已过 `expires_at` 的会话
    async fn overdue(&self, now: DateTime<Utc>) -> StoreResult<Vec<GuestSession>>;
}

/// 进程内会话存储 (DashMap)
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, GuestSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// 当前存储的会话数量 (测试和指标用)
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: GuestSession) -> StoreResult<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<GuestSession>> {
        Ok(self.sessions.get(id).map(|s| s.clone()))
    }

    async fn transition(
        &self,
        id: &str,
        status: SessionStatus,
        reason: Option<String>,
    ) -> StoreResult<GuestSession> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {}", id)))?;

        if entry.status.is_terminal() {
            return Err(StoreError::Conflict(format!(
                "session {} already {}",
                id, entry.status
            )));
        }

        entry.status = status;
        if status == SessionStatus::Revoked {
            entry.revoke_reason = reason;
        }
        Ok(entry.clone())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("session {}", id)))?;

        // last_activity_at 单调不减
        if at > entry.last_activity_at {
            entry.last_activity_at = at;
        }
        Ok(())
    }

    async fn overdue(&self, now: DateTime<Utc>) -> StoreResult<Vec<GuestSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Active && now >= s.expires_at)
            .map(|s| s.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_session(id: &str, ttl_secs: i64) -> GuestSession {
        let now = Utc::now();
        GuestSession {
            id: id.to_string(),
            restaurant_id: "rest_1".to_string(),
            table_id: "table_1".to_string(),
            table_name: None,
            device_fingerprint: None,
            status: SessionStatus::Active,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
            last_activity_at: now,
            revoke_reason: None,
        }
    }

    #[tokio::test]
    async fn test_transition_is_one_way() {
        let store = MemorySessionStore::new();
        store.save(test_session("s1", 600)).await.unwrap();

        let revoked = store
            .transition("s1", SessionStatus::Revoked, Some("table closed".into()))
            .await
            .unwrap();
        assert_eq!(revoked.status, SessionStatus::Revoked);
        assert_eq!(revoked.revoke_reason.as_deref(), Some("table closed"));

        // 终态后不可再迁移
        let err = store
            .transition("s1", SessionStatus::Expired, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let stored = store.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Revoked);
    }

    #[tokio::test]
    async fn test_touch_is_monotonic() {
        let store = MemorySessionStore::new();
        let session = test_session("s1", 600);
        let t0 = session.last_activity_at;
        store.save(session).await.unwrap();

        let later = t0 + Duration::seconds(30);
        store.touch("s1", later).await.unwrap();
        // 落后的时间戳不回退
        store.touch("s1", t0 - Duration::seconds(30)).await.unwrap();

        let stored = store.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(stored.last_activity_at, later);
    }

    #[tokio::test]
    async fn test_overdue_only_lists_active_past_deadline() {
        let store = MemorySessionStore::new();
        store.save(test_session("fresh", 600)).await.unwrap();
        store.save(test_session("stale", -10)).await.unwrap();

        let mut revoked = test_session("revoked", -10);
        revoked.status = SessionStatus::Revoked;
        store.save(revoked).await.unwrap();

        let overdue = store.overdue(Utc::now()).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, "stale");
    }
}
