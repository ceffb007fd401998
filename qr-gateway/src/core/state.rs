use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::approval::ApprovalCoordinator;
use crate::core::Config;
use crate::notify::BusNotifier;
use crate::requests::GuestRequestService;
use crate::session::{SessionManager, run_sweeper};
use crate::store::{MemoryRequestStore, MemorySessionStore};
use crate::token::{QrVersionRegistry, TokenService};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 网关的核心数据结构，使用 Arc 实现浅拷贝，克隆成本极低。
/// 生命周期跟随宿主进程，没有任何静态/全局可变状态。
///
/// # 服务组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | tokens | 令牌编解码服务 |
/// | qr_versions | 餐厅 QR 版本注册表 |
/// | sessions | 会话管理器 |
/// | requests | 访客请求受理服务 |
/// | approvals | 审批协调器 |
/// | notifier | 进程内实时推送总线 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 令牌编解码服务
    pub tokens: Arc<TokenService>,
    /// QR 版本注册表
    pub qr_versions: Arc<QrVersionRegistry>,
    /// 会话管理器
    pub sessions: Arc<SessionManager>,
    /// 访客请求受理服务
    pub requests: Arc<GuestRequestService>,
    /// 审批协调器
    pub approvals: Arc<ApprovalCoordinator>,
    /// 进程内推送总线 (实时传输与测试从这里订阅)
    pub notifier: Arc<BusNotifier>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按依赖顺序组装: 推送总线 -> 存储 -> 令牌服务 -> 三个核心服务。
    /// 存储为进程内实现；接其他持久化后端时在这里替换注入。
    pub fn initialize(config: &Config) -> Self {
        let notifier = Arc::new(BusNotifier::new());
        let session_store = Arc::new(MemorySessionStore::new());
        let request_store = Arc::new(MemoryRequestStore::new());

        let tokens = Arc::new(TokenService::with_config(config.token.clone()));
        let qr_versions = Arc::new(QrVersionRegistry::new());

        let sessions = Arc::new(SessionManager::new(
            session_store,
            notifier.clone(),
            config.session_ttl_secs,
            config.notify_timeout(),
        ));
        let requests = Arc::new(GuestRequestService::new(
            sessions.clone(),
            request_store.clone(),
            notifier.clone(),
            config.notify_timeout(),
        ));
        let approvals = Arc::new(ApprovalCoordinator::new(
            request_store,
            notifier.clone(),
            config.notify_timeout(),
        ));

        Self {
            config: config.clone(),
            tokens,
            qr_versions,
            sessions,
            requests,
            approvals,
            notifier,
        }
    }

    /// 启动后台任务 (过期清扫)
    ///
    /// 返回的 token 用于 graceful shutdown。
    pub fn start_background_tasks(&self) -> CancellationToken {
        let shutdown = CancellationToken::new();
        tokio::spawn(run_sweeper(
            self.sessions.clone(),
            self.config.sweep_interval(),
            shutdown.clone(),
        ));
        shutdown
    }

    /// 获取令牌服务
    pub fn token_service(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }
}
