//! 实时推送端口
//!
//! 审批结果和新请求通过外部实时传输推送到员工看板和访客客户端。
//! 核心只依赖 [`GuestNotifier`] 端口，宿主注入具体传输；
//! 测试可替换为录制/失败替身 (`test-util` feature)。
//!
//! 推送是尽力而为的旁路信号: 投递失败只记日志，
//! 永远不回滚已提交的状态迁移。

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::broadcast;

use shared::message::{ChannelEvent, PushChannel};

/// 每个频道的广播容量
const CHANNEL_CAPACITY: usize = 256;

/// 推送错误
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("推送传输失败: {0}")]
    Transport(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// 实时推送端口
#[async_trait]
pub trait GuestNotifier: Send + Sync {
    /// 向指定频道推送事件 (尽力而为)
    async fn notify(&self, channel: PushChannel, event: ChannelEvent) -> NotifyResult<()>;
}

/// 带超时的尽力推送
///
/// 投递失败或超时只记日志；调用方已提交的状态迁移不回滚。
pub async fn notify_best_effort(
    notifier: &dyn GuestNotifier,
    timeout: std::time::Duration,
    channel: PushChannel,
    event: ChannelEvent,
) {
    match tokio::time::timeout(timeout, notifier.notify(channel.clone(), event)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(channel = %channel, error = %e, "Push notification failed");
        }
        Err(_) => {
            tracing::warn!(channel = %channel, timeout_ms = timeout.as_millis() as u64, "Push notification timed out");
        }
    }
}

/// 基于 tokio broadcast 的进程内推送实现
///
/// 每个频道懒创建一个 broadcast channel；外部实时传输
/// (WebSocket 网关等) 通过 [`subscribe`](Self::subscribe) 挂载，
/// 集成测试同样走这条路订阅断言。
#[derive(Debug, Default)]
pub struct BusNotifier {
    channels: DashMap<PushChannel, broadcast::Sender<ChannelEvent>>,
}

impl BusNotifier {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// 订阅某个频道
    pub fn subscribe(&self, channel: PushChannel) -> broadcast::Receiver<ChannelEvent> {
        self.channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl GuestNotifier for BusNotifier {
    async fn notify(&self, channel: PushChannel, event: ChannelEvent) -> NotifyResult<()> {
        match self.channels.get(&channel) {
            Some(tx) => {
                // send 仅在没有任何订阅者时失败，对旁路信号而言不算错误
                if tx.send(event).is_err() {
                    tracing::debug!(channel = %channel, "No subscribers on channel, event dropped");
                }
                Ok(())
            }
            None => {
                tracing::debug!(channel = %channel, "Channel never subscribed, event dropped");
                Ok(())
            }
        }
    }
}

/// 录制型推送实现 (测试用)
///
/// 捕获全部事件供断言；随 `test-util` feature 提供给下游的测试。
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: parking_lot::Mutex<Vec<(PushChannel, ChannelEvent)>>,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已捕获的事件快照
    pub fn events(&self) -> Vec<(PushChannel, ChannelEvent)> {
        self.events.lock().clone()
    }

    /// 推送到指定频道的事件数
    pub fn count_for(&self, channel: &PushChannel) -> usize {
        self.events.lock().iter().filter(|(c, _)| c == channel).count()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl GuestNotifier for RecordingNotifier {
    async fn notify(&self, channel: PushChannel, event: ChannelEvent) -> NotifyResult<()> {
        self.events.lock().push((channel, event));
        Ok(())
    }
}

/// 总是失败的推送实现 (测试投递失败路径用)
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl GuestNotifier for FailingNotifier {
    async fn notify(&self, _channel: PushChannel, _event: ChannelEvent) -> NotifyResult<()> {
        Err(NotifyError::Transport("simulated transport failure".into()))
    }
}
