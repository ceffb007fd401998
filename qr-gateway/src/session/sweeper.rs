//! 过期清扫后台任务
//!
//! 惰性过期保证了正确性，本任务负责一致性:
//! 周期性把越期会话的存储状态落为 `Expired`，
//! 让看板统计和审计数据不依赖"恰好有人读过"。

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::SessionManager;

/// 运行清扫循环，收到 shutdown 信号后退出
///
/// 单轮失败只记日志，下一轮照常执行；清扫永远不阻塞请求受理。
pub async fn run_sweeper(
    sessions: Arc<SessionManager>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // 启动时的第一个 tick 立即触发，先消费掉
    ticker.tick().await;

    tracing::info!(interval_secs = interval.as_secs(), "Session expiry sweeper started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Session expiry sweeper stopped");
                break;
            }
            _ = ticker.tick() => {
                let swept = sessions.sweep_expired().await;
                if swept > 0 {
                    tracing::debug!(count = swept, "Sweep pass complete");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::store::MemorySessionStore;
    use chrono::Utc;
    use shared::models::QrTokenPayload;

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let manager = Arc::new(SessionManager::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(RecordingNotifier::new()),
            0,
            Duration::from_millis(100),
        ));
        manager
            .create_session(
                &QrTokenPayload {
                    restaurant_id: "rest_1".into(),
                    table_id: "t1".into(),
                    qr_version: 1,
                    iat: Utc::now().timestamp(),
                    token_type: "qr".into(),
                },
                None,
                None,
            )
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_sweeper(
            manager.clone(),
            Duration::from_millis(10),
            shutdown.clone(),
        ));

        // 给清扫循环至少一轮的时间
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.unwrap();

        // 过期会话已被清扫
        assert_eq!(manager.sweep_expired().await, 0);
    }
}
