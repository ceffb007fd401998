//! Request Store
//!
//! 访客请求的持久化端口与进程内实现。
//!
//! 幂等约束落在这一层: `(session_id, client_request_id)` 唯一，
//! 并发重试的第二个写者拿到第一个写者创建的请求而非错误。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use shared::models::{GuestRequest, RequestResolution};

use super::{StoreError, StoreResult};

/// 请求存储端口
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 插入请求；若同会话下已有相同 client_request_id 的请求，
    /// 返回已存在的那个。布尔值表示本次是否真正新建。
    async fn find_or_insert(&self, request: GuestRequest) -> StoreResult<(GuestRequest, bool)>;

    /// 按 ID 查找
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<GuestRequest>>;

    /// 终态迁移 (compare-and-set: 仅 Pending 可迁移)
    ///
    /// 已有终态时返回 `Conflict` 且不改动原结果。
    async fn resolve(
        &self,
        id: &str,
        resolution: RequestResolution,
        staff_id: &str,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> StoreResult<GuestRequest>;

    /// 某餐厅所有待处理请求 (按创建时间升序)
    async fn pending_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<GuestRequest>>;
}

/// 进程内请求存储 (DashMap)
///
/// `dedup` 是 (session_id, client_request_id) -> request_id 的唯一索引，
/// 通过 entry API 原子占位，保证并发重试只产生一条请求。
#[derive(Debug, Default)]
pub struct MemoryRequestStore {
    requests: DashMap<String, GuestRequest>,
    dedup: DashMap<(String, String), String>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
            dedup: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn find_or_insert(&self, request: GuestRequest) -> StoreResult<(GuestRequest, bool)> {
        use shared::models::GuestRequestKind;

        let dedup_key = match &request.kind {
            GuestRequestKind::Order(info) => info
                .client_request_id
                .as_ref()
                .map(|cid| (request.session_id.clone(), cid.clone())),
            _ => None,
        };

        if let Some(key) = dedup_key {
            // 先写请求行，再发布去重索引: 索引一旦可见，
            // 它指向的行必然已经存在
            self.requests.insert(request.id.clone(), request.clone());
            match self.dedup.entry(key) {
                Entry::Occupied(existing) => {
                    let winner_id = existing.get().clone();
                    drop(existing);
                    // 并发占位输了: 撤掉自己的行，返回首个写者的结果
                    self.requests.remove(&request.id);
                    let prior = self
                        .requests
                        .get(&winner_id)
                        .map(|r| r.clone())
                        .ok_or_else(|| {
                            StoreError::Backend(format!(
                                "dedup index points at missing request {}",
                                winner_id
                            ))
                        })?;
                    return Ok((prior, false));
                }
                Entry::Vacant(slot) => {
                    slot.insert(request.id.clone());
                }
            }
            return Ok((request, true));
        }

        self.requests.insert(request.id.clone(), request.clone());
        Ok((request, true))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<GuestRequest>> {
        Ok(self.requests.get(id).map(|r| r.clone()))
    }

    async fn resolve(
        &self,
        id: &str,
        resolution: RequestResolution,
        staff_id: &str,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> StoreResult<GuestRequest> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("request {}", id)))?;

        if entry.resolution != RequestResolution::Pending {
            return Err(StoreError::Conflict(format!(
                "request {} already {}",
                id, entry.resolution
            )));
        }

        entry.resolution = resolution;
        entry.resolved_by = Some(staff_id.to_string());
        entry.resolved_at = Some(at);
        entry.resolution_notes = notes;
        Ok(entry.clone())
    }

    async fn pending_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<GuestRequest>> {
        let mut pending: Vec<GuestRequest> = self
            .requests
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id && r.is_pending())
            .map(|r| r.clone())
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }
}
