//! 会话模块
//!
//! - [`manager`]: 会话生命周期 (创建 / 校验 / 触活 / 撤销 / 清扫)
//! - [`sweeper`]: 周期性过期清扫后台任务

pub mod manager;
pub mod sweeper;

pub use manager::{SessionError, SessionManager};
pub use sweeper::run_sweeper;
