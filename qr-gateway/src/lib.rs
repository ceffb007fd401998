//! QR Guest Gateway - 多租户餐厅扫码点餐会话网关
//!
//! # 架构概述
//!
//! 匿名食客扫描桌台 QR 码，兑换出一个作用域为单张桌台的会话令牌，
//! 然后对餐厅的实时订单板提交订单和请求 (呼叫服务员、请求结账)，
//! 由员工审批/拒绝。核心功能：
//!
//! - **令牌** (`token`): QR 令牌与访客访问令牌的签发/验证，QR 版本注册表
//! - **会话** (`session`): 会话生命周期、惰性过期、周期清扫
//! - **请求受理** (`requests`): 三类访客请求的幂等受理
//! - **审批** (`approval`): pending -> approved/rejected 状态机
//! - **推送** (`notify`): 员工/访客双频道的尽力而为实时推送端口
//! - **HTTP API** (`api`): 最小 HTTP 表面
//!
//! # 模块结构
//!
//! ```text
//! qr-gateway/src/
//! ├── core/          # 配置、状态、服务器、错误
//! ├── token/         # 令牌编解码、QR 版本注册表
//! ├── session/       # 会话管理、过期清扫
//! ├── requests/      # 访客请求受理
//! ├── approval/      # 员工审批协调
//! ├── notify/        # 实时推送端口
//! ├── store/         # 持久化端口及进程内实现
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误映射、日志
//! ```

pub mod api;
pub mod approval;
pub mod core;
pub mod notify;
pub mod requests;
pub mod session;
pub mod store;
pub mod token;
pub mod utils;

// Re-export 公共类型
pub use approval::ApprovalCoordinator;
pub use core::{Config, GatewayError, GatewayResult, Server, ServerState};
pub use notify::{BusNotifier, GuestNotifier};
pub use requests::GuestRequestService;
pub use session::{SessionError, SessionManager};
pub use token::{QrVersionRegistry, TokenConfig, TokenService};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_level};

pub fn print_banner() {
    println!(
        r#"
   ____  ____     ______      __
  / __ \/ __ \   / ____/___ _/ /____ _      ______ ___  __
 / / / / /_/ /  / / __/ __ `/ __/ _ \ | /| / / __ `/ / / /
/ /_/ / _, _/  / /_/ / /_/ / /_/  __/ |/ |/ / /_/ / /_/ /
\___\_\_/ |_|   \____/\__,_/\__/\___/|__/|__/\__,_/\__, /
                                                  /____/
    "#
    );
}
